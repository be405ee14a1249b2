// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small main menu loaded from JSON and driven by keyboard input.
//!
//! The layout, a prefab and a shared include all live in an in-memory data source. The menu
//! is rendered into the headless renderer, which records draw commands instead of drawing.
//!
//! Run:
//! - `cargo run -p understory_demos --example uitk_menu`
//! - `RUST_LOG=understory_uitk=debug cargo run -p understory_demos --example uitk_menu`

use tracing_subscriber::EnvFilter;
use understory_focus::input::{InputState, NavKeys};
use understory_style::HeadlessRenderer;
use understory_uitk::data::MemoryDataSource;
use understory_uitk::widgets::{Button, TwistMenu};
use understory_uitk::{UiConfig, UiManager};

const THEME: &str = r##"{
    "definitions": { "#accent": "#3080F0", "#button_size": [240, 40] },
    "styles": [
        { "classId": "BasicStyle", "id": "panel", "padding": [8, 8, 8, 8] },
        {
            "classId": "TextStyle", "id": "label", "color": "#accent",
            "textStyle": { "fontSize": 24, "horizontalAlign": "center", "verticalAlign": "middle" }
        }
    ]
}"##;

const BUTTON: &str = r##"{
    "prefab": {
        "classId": "Button", "styleId": "label", "focusable": true, "size": "#button_size"
    }
}"##;

const MENU: &str = r##"{
    "includes": ["theme.json"],
    "layout": {
        "id": "menu", "classId": "VerticalStackPanel", "styleId": "panel",
        "stackElementPadding": 6,
        "positioningAnchor": ["center", "middle"],
        "sizingAnchor": ["center", "middle"],
        "size": [256, 200],
        "childElements": [
            { "id": "play", "prefabRef": "button.json", "button": { "text": "Play" } },
            {
                "id": "difficulty", "classId": "TwistMenu", "focusable": true,
                "size": "#button_size",
                "twistMenu": { "items": ["Easy", "Normal", "Hard"] }
            },
            { "id": "quit", "prefabRef": "button.json", "button": { "text": "Quit" } }
        ]
    }
}"##;

fn frame(ui: &mut UiManager, input: &mut InputState, keys: NavKeys) {
    input.begin_frame();
    input.set_keys_down(keys);
    ui.update(1.0 / 60.0, input);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let source = MemoryDataSource::new()
        .with_file("theme.json", THEME)
        .with_file("button.json", BUTTON)
        .with_file("menu.json", MENU);
    let mut ui = UiManager::new(UiConfig::default()).with_data_source(source);
    ui.set_window_size(1280, 720);

    let menu = match ui.add_child_from_layout(ui.root(), "menu.json") {
        Ok(menu) => menu,
        Err(err) => {
            eprintln!("failed to load the menu: {err}");
            return;
        }
    };
    let mut input = InputState::new();

    // The first update lays the stack out and focuses its first button.
    frame(&mut ui, &mut input, NavKeys::empty());
    println!("focused: {:?}", ui.focused().and_then(|e| ui.tree().id(e)));

    frame(&mut ui, &mut input, NavKeys::DOWN);
    frame(&mut ui, &mut input, NavKeys::empty());
    println!("focused: {:?}", ui.focused().and_then(|e| ui.tree().id(e)));

    // Left and right step the twist menu while it is focused or hovered.
    frame(&mut ui, &mut input, NavKeys::RIGHT);
    frame(&mut ui, &mut input, NavKeys::empty());
    let difficulty = ui.find_by_id("difficulty");
    if let Some(twist) = difficulty.and_then(|e| ui.widget::<TwistMenu>(e)) {
        println!("difficulty: {}", twist.current_item());
    }

    frame(&mut ui, &mut input, NavKeys::DOWN);
    frame(&mut ui, &mut input, NavKeys::empty());
    frame(&mut ui, &mut input, NavKeys::ACCEPT);
    if let Some(quit) = ui.find_by_id("quit") {
        let pressed = ui.widget::<Button>(quit).is_some_and(Button::was_pressed);
        println!("quit pressed: {pressed}");
    }

    let mut renderer = HeadlessRenderer::new();
    if let Err(err) = ui.render_to(&mut renderer) {
        eprintln!("render failed: {err}");
    }
    println!("== {} draw commands ==", renderer.commands().len());
    for command in renderer.commands() {
        println!("  {command:?}");
    }

    ui.remove_element(menu);
    println!("elements left: {}", ui.tree().len());
}
