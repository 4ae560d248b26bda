//! Top bar, add-camera form and tag filter bar.

use std::collections::BTreeSet;

use eframe::egui;

use super::ActionQueue;
use crate::core::camera_events::{
    AddCameraEvent, ExportCamerasEvent, ImportCamerasEvent, SetTagFilterEvent, ToggleSettingsEvent,
    ToggleThemeEvent,
};
use crate::core::registry::TagFilter;

pub const APP_TITLE: &str = "Local IP TV";

/// Raw text of the add-camera form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AddForm {
    pub name: String,
    pub url: String,
    pub tags: String,
}

impl AddForm {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn to_event(&self) -> AddCameraEvent {
        AddCameraEvent {
            name: self.name.clone(),
            url: self.url.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// Label of the theme button: names the mode it switches to.
pub fn theme_button_label(dark_mode: bool) -> &'static str {
    if dark_mode { "Light Mode" } else { "Dark Mode" }
}

/// Title, theme switch, import/export and settings.
pub fn render_top_bar(ui: &mut egui::Ui, dark_mode: bool, actions: &mut ActionQueue) {
    ui.horizontal(|ui| {
        ui.heading(APP_TITLE);

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("Settings").clicked() {
                actions.send(ToggleSettingsEvent);
            }
            if ui
                .button("Export")
                .on_hover_text("Save the camera list to a JSON file")
                .clicked()
                && let Some(path) = rfd::FileDialog::new()
                    .add_filter("JSON", &["json"])
                    .set_file_name("cameras.json")
                    .save_file()
            {
                actions.send(ExportCamerasEvent(path));
            }
            if ui
                .button("Import")
                .on_hover_text("Replace the camera list with a JSON file")
                .clicked()
                && let Some(path) = rfd::FileDialog::new()
                    .add_filter("JSON", &["json"])
                    .pick_file()
            {
                actions.send(ImportCamerasEvent(path));
            }
            if ui.button(theme_button_label(dark_mode)).clicked() {
                actions.send(ToggleThemeEvent);
            }
        });
    });
}

/// Name / URL / tags inputs with the Add button. Enter in any field submits.
pub fn render_add_form(
    ui: &mut egui::Ui,
    form: &mut AddForm,
    error: Option<&str>,
    actions: &mut ActionQueue,
) {
    let mut submit = false;

    ui.horizontal_wrapped(|ui| {
        let name = ui.add(
            egui::TextEdit::singleline(&mut form.name)
                .hint_text("Camera Name")
                .desired_width(160.0),
        );
        let url = ui.add(
            egui::TextEdit::singleline(&mut form.url)
                .hint_text("IP or URL (rtsp://, http://)")
                .desired_width(260.0),
        );
        let tags = ui.add(
            egui::TextEdit::singleline(&mut form.tags)
                .hint_text("Tags (comma separated)")
                .desired_width(180.0),
        );

        let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
        submit |= enter && (name.lost_focus() || url.lost_focus() || tags.lost_focus());
        submit |= ui.button("Add Camera").clicked();
    });

    if let Some(error) = error {
        ui.colored_label(ui.visuals().error_fg_color, error);
    }

    if submit {
        actions.send(form.to_event());
    }
}

/// "All" followed by every tag in use. The active filter is highlighted.
pub fn render_filter_bar(
    ui: &mut egui::Ui,
    tags: &BTreeSet<String>,
    current: &TagFilter,
    actions: &mut ActionQueue,
) {
    ui.horizontal_wrapped(|ui| {
        ui.label("Filter:");
        for filter in filter_options(tags) {
            if ui.selectable_label(&filter == current, filter.label()).clicked() && &filter != current {
                actions.send(SetTagFilterEvent(filter));
            }
        }
    });
}

/// Filter choices in display order.
pub fn filter_options(tags: &BTreeSet<String>) -> Vec<TagFilter> {
    std::iter::once(TagFilter::All)
        .chain(tags.iter().map(|t| TagFilter::Tag(t.clone())))
        .collect()
}
