use serenity::all::ButtonStyle;
use serenity::builder::{
    CreateActionRow, CreateButton, CreateSelectMenu, CreateSelectMenuKind, CreateSelectMenuOption,
};

use crate::flows::gvg_builder::{self, GvgBuilder};
use crate::flows::role_picker::{self, RolePicker};
use crate::flows::{component_id, reaction_canvas};

/* Role picker: multi-select of guild roles */
pub fn role_select_row(picker: &RolePicker) -> CreateActionRow {
    let options = picker
        .options()
        .iter()
        .map(|role| {
            CreateSelectMenuOption::new(&role.name, role.id.to_string())
                .default_selection(picker.is_selected(role.id))
        })
        .collect::<Vec<_>>();
    let max = options.len().min(role_picker::MAX_ROLE_OPTIONS) as u8;

    let menu = CreateSelectMenu::new(
        component_id(role_picker::ACTION_SELECT, picker.id),
        CreateSelectMenuKind::String { options },
    )
    .placeholder("Choose roles...")
    .min_values(0)
    .max_values(max);

    CreateActionRow::SelectMenu(menu)
}

pub fn role_save_row(picker: &RolePicker) -> CreateActionRow {
    CreateActionRow::Buttons(vec![CreateButton::new(component_id(
        role_picker::ACTION_SAVE,
        picker.id,
    ))
    .label("Save")
    .style(ButtonStyle::Success)])
}

/* Reaction canvas */
pub fn canvas_save_row(flow_id: uuid::Uuid) -> CreateActionRow {
    CreateActionRow::Buttons(vec![CreateButton::new(component_id(
        reaction_canvas::ACTION_SAVE,
        flow_id,
    ))
    .label("Save & Clean Up")
    .style(ButtonStyle::Success)])
}

/* Single-choice menu that keeps showing the current pick */
fn sticky_select_row(
    custom_id: String,
    placeholder: &str,
    options: Vec<(String, String)>,
    selected: Option<&str>,
) -> CreateActionRow {
    let options = options
        .into_iter()
        .map(|(label, value)| {
            let is_selected = selected == Some(value.as_str());
            CreateSelectMenuOption::new(label, value).default_selection(is_selected)
        })
        .collect::<Vec<_>>();

    let menu = CreateSelectMenu::new(custom_id, CreateSelectMenuKind::String { options })
        .placeholder(placeholder)
        .min_values(1)
        .max_values(1);

    CreateActionRow::SelectMenu(menu)
}

/* GvG builder: date row, time row, buttons */
pub fn builder_rows(builder: &GvgBuilder) -> Vec<CreateActionRow> {
    let date = builder.date_value();
    let time = builder.time_value();
    vec![
        sticky_select_row(
            component_id(gvg_builder::ACTION_DATE, builder.id),
            "Add Date",
            gvg_builder::date_options(builder.today()),
            date.as_deref(),
        ),
        sticky_select_row(
            component_id(gvg_builder::ACTION_TIME, builder.id),
            "Add Time",
            gvg_builder::time_options(),
            time.as_deref(),
        ),
        CreateActionRow::Buttons(vec![
            CreateButton::new(component_id(gvg_builder::ACTION_ADD, builder.id))
                .label("Add")
                .style(ButtonStyle::Primary),
            CreateButton::new(component_id(gvg_builder::ACTION_REMOVE, builder.id))
                .label("Remove Top")
                .style(ButtonStyle::Danger),
            CreateButton::new(component_id(gvg_builder::ACTION_POST, builder.id))
                .label("Post")
                .style(ButtonStyle::Success),
        ]),
    ]
}
