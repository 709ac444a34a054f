use client_core::{ClientSettings, FlowLabels, IssueState, Presenter, UserIntent, VerifyState};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{is_submittable_endpoint, ExchangeKind};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::UiEvent,
    orchestration::{apply_ui_event, route_intent},
};
use crate::ui::widgets;

pub struct WalletApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    presenter: Presenter,
    status: String,
}

impl WalletApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        settings: &ClientSettings,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            presenter: Presenter::new(settings),
            status: "Starting exchange worker...".to_string(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            apply_ui_event(&mut self.presenter, event, &mut self.status);
        }
    }

    fn show_flow_tabs(&self, ui: &mut egui::Ui, intents: &mut Vec<UserIntent>) {
        let active = self.presenter.active();
        let mut selected = active;
        ui.add_enabled_ui(!self.presenter.ui().is_loading(), |ui| {
            ui.horizontal(|ui| {
                for kind in [ExchangeKind::Verify, ExchangeKind::Issue] {
                    ui.selectable_value(&mut selected, kind, FlowLabels::for_kind(kind).tab);
                }
            });
        });
        if selected != active {
            intents.push(UserIntent::SelectFlow(selected));
        }
    }

    fn show_endpoint_entry(
        &self,
        ui: &mut egui::Ui,
        labels: &FlowLabels,
        busy: bool,
        intents: &mut Vec<UserIntent>,
    ) {
        ui.heading(labels.title);
        ui.add_space(6.0);

        let mut endpoint = self.presenter.endpoint().to_string();
        let mut submit = false;
        ui.horizontal(|ui| {
            let edit = ui.add_enabled(
                !busy,
                egui::TextEdit::singleline(&mut endpoint)
                    .hint_text("https://issuer.example")
                    .desired_width(320.0),
            );
            if edit.changed() {
                intents.push(UserIntent::EditEndpoint(endpoint.clone()));
            }
            if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submit = true;
            }

            let can_submit = !busy && is_submittable_endpoint(&endpoint);
            if ui
                .add_enabled(can_submit, egui::Button::new(labels.submit))
                .clicked()
            {
                submit = true;
            }
            if busy {
                ui.spinner();
            }
        });

        if submit && !busy && is_submittable_endpoint(&endpoint) {
            intents.push(UserIntent::Submit);
        }
    }

    fn show_active_flow(&self, ui: &mut egui::Ui, intents: &mut Vec<UserIntent>) {
        let labels = self.presenter.labels();
        let busy = self.presenter.ui().is_loading();

        match self.presenter.active() {
            ExchangeKind::Verify => match self.presenter.verify().state() {
                VerifyState::PromptReady(prompt) => {
                    widgets::verify_prompt_card(ui, prompt, &labels, busy, intents);
                }
                VerifyState::Submitting => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Presenting credential...");
                    });
                }
                VerifyState::Idle | VerifyState::AwaitingPrompt => {
                    self.show_endpoint_entry(ui, &labels, busy, intents);
                }
            },
            ExchangeKind::Issue => match self.presenter.issue().state() {
                IssueState::PromptReady(prompt) => {
                    widgets::issue_prompt_card(ui, prompt, &labels, busy, intents);
                }
                IssueState::CollectingFields(form) => {
                    ui.heading("Fill in the requested fields");
                    ui.add_space(6.0);
                    widgets::field_form(ui, form, &labels, busy, intents);
                }
                IssueState::Submitting => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Requesting credential...");
                    });
                }
                IssueState::Idle | IssueState::AwaitingPrompt => {
                    self.show_endpoint_entry(ui, &labels, busy, intents);
                }
            },
        }
    }
}

impl eframe::App for WalletApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let mut intents = Vec::new();

        egui::TopBottomPanel::top("flow_tabs").show(ctx, |ui| {
            ui.add_space(4.0);
            self.show_flow_tabs(ui, &mut intents);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.small(egui::RichText::new(&self.status).weak());
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(alert) = self.presenter.ui().current_alert() {
                if widgets::alert_banner(ui, alert) {
                    intents.push(UserIntent::DismissAlert);
                }
                ui.add_space(8.0);
            }
            self.show_active_flow(ui, &mut intents);
        });

        for intent in intents {
            route_intent(&self.cmd_tx, &mut self.presenter, intent);
        }

        if self.presenter.ui().is_loading() {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

impl Drop for WalletApp {
    fn drop(&mut self) {
        let _ = self.cmd_tx.try_send(BackendCommand::Shutdown);
    }
}
