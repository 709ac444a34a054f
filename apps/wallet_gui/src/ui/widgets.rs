use client_core::{FlowLabels, UserIntent};
use eframe::egui;
use shared::{
    alert::{Alert, AlertKind},
    domain::{FieldForm, IssuePrompt, VerifyPrompt},
};

/// Draws the alert banner. Returns true when the user dismissed it.
pub fn alert_banner(ui: &mut egui::Ui, alert: &Alert) -> bool {
    let (fill, stroke) = match alert.kind() {
        AlertKind::Success => (
            egui::Color32::from_rgb(44, 92, 60),
            egui::Color32::from_rgb(92, 160, 110),
        ),
        AlertKind::Warning => (
            egui::Color32::from_rgb(110, 88, 36),
            egui::Color32::from_rgb(190, 156, 80),
        ),
        AlertKind::Error => (
            egui::Color32::from_rgb(111, 53, 53),
            egui::Color32::from_rgb(175, 96, 96),
        ),
    };

    let mut dismissed = false;
    egui::Frame::NONE
        .fill(fill)
        .stroke(egui::Stroke::new(1.0, stroke))
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 8))
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.label(egui::RichText::new(alert.text()).color(egui::Color32::WHITE));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Dismiss").clicked() {
                        dismissed = true;
                    }
                });
            });
        });
    dismissed
}

fn prompt_header(ui: &mut egui::Ui, name: &str, domain: &str) {
    ui.label(egui::RichText::new(name).strong().size(18.0));
    ui.label(egui::RichText::new(domain).weak());
}

fn decision_buttons(
    ui: &mut egui::Ui,
    labels: &FlowLabels,
    busy: bool,
    intents: &mut Vec<UserIntent>,
) {
    ui.horizontal(|ui| {
        if ui
            .add_enabled(!busy, egui::Button::new(labels.accept))
            .clicked()
        {
            intents.push(UserIntent::Accept);
        }
        if ui
            .add_enabled(!busy, egui::Button::new(labels.deny))
            .clicked()
        {
            intents.push(UserIntent::Deny);
        }
    });
}

pub fn verify_prompt_card(
    ui: &mut egui::Ui,
    prompt: &VerifyPrompt,
    labels: &FlowLabels,
    busy: bool,
    intents: &mut Vec<UserIntent>,
) {
    ui.group(|ui| {
        prompt_header(ui, &prompt.name, &prompt.domain);
        let trust = if prompt.trusted_by_issuer {
            egui::RichText::new("Trusted by issuer: yes").color(egui::Color32::from_rgb(92, 160, 110))
        } else {
            egui::RichText::new("Trusted by issuer: no").color(egui::Color32::from_rgb(175, 96, 96))
        };
        ui.label(trust);
        ui.separator();
        ui.label(&prompt.purpose);
        ui.add_space(8.0);
        decision_buttons(ui, labels, busy, intents);
    });
}

pub fn issue_prompt_card(
    ui: &mut egui::Ui,
    prompt: &IssuePrompt,
    labels: &FlowLabels,
    busy: bool,
    intents: &mut Vec<UserIntent>,
) {
    ui.group(|ui| {
        prompt_header(ui, &prompt.name, &prompt.domain);
        ui.separator();
        ui.label(&prompt.purpose);
        ui.add_space(8.0);
        decision_buttons(ui, labels, busy, intents);
    });
}

pub fn field_form(
    ui: &mut egui::Ui,
    form: &FieldForm,
    labels: &FlowLabels,
    busy: bool,
    intents: &mut Vec<UserIntent>,
) {
    egui::Grid::new("issue_field_form")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            for (name, value) in form.iter() {
                ui.label(name);
                let mut draft = value.to_string();
                if ui
                    .add_enabled(!busy, egui::TextEdit::singleline(&mut draft))
                    .changed()
                {
                    intents.push(UserIntent::EditField {
                        name: name.to_string(),
                        value: draft,
                    });
                }
                ui.end_row();
            }
        });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        if ui
            .add_enabled(!busy, egui::Button::new(labels.submit_fields))
            .clicked()
        {
            intents.push(UserIntent::Submit);
        }
        if ui
            .add_enabled(!busy, egui::Button::new(labels.deny))
            .clicked()
        {
            intents.push(UserIntent::Deny);
        }
    });
}
