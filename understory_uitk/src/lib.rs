// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_uitk --heading-base-level=0

//! Understory UITK: a retained-mode UI scene with widgets, focus, and JSON layouts.
//!
//! ## Overview
//!
//! [`UiManager`] owns one scene: an [`understory_element_tree::ElementTree`] for hierarchy and
//! layout, a widget per element, the [`understory_style::StyleSheet`], and the focus and hover
//! state. Each frame the application feeds an [`understory_focus::input::InputState`] to
//! [`UiManager::update`] and then calls [`UiManager::render`] (or
//! [`UiManager::render_to`] with its own renderer).
//!
//! - [`widgets`]: the closed set of widget classes (panels, text, images, buttons, check
//!   boxes, progress bars, sliders, stack panels, console windows, twist menus).
//! - [`data`]: JSON plumbing: definitions, merge patches, typed field access, and styles.
//! - Layouts and prefabs load from JSON through a [`data::DataSource`]. A failed load leaves
//!   the scene as it was.
//!
//! ## Example
//!
//! ```
//! use understory_focus::input::{InputState, NavKeys};
//! use understory_uitk::{UiConfig, UiManager};
//! use understory_uitk::widgets::Button;
//!
//! let mut ui = UiManager::new(UiConfig::default());
//! let menu = ui
//!     .load_layout_from_str(
//!         "menu",
//!         r#"{
//!             "layout": {
//!                 "id": "menu", "classId": "VerticalStackPanel",
//!                 "childElements": [
//!                     { "id": "play", "classId": "Button", "focusable": true, "size": [200, 40] },
//!                     { "id": "quit", "classId": "Button", "focusable": true, "size": [200, 40] }
//!                 ]
//!             }
//!         }"#,
//!     )
//!     .unwrap();
//! ui.add_child(menu, ui.root());
//!
//! let mut input = InputState::new();
//! ui.update(0.016, &input);
//! assert_eq!(ui.focused(), ui.find_by_id("play"));
//!
//! input.begin_frame();
//! input.set_keys_down(NavKeys::DOWN);
//! ui.update(0.016, &input);
//! let quit = ui.find_by_id("quit").unwrap();
//! assert_eq!(ui.focused(), Some(quit));
//! assert!(ui.widget::<Button>(quit).is_some());
//! ```

mod config;
pub mod data;
mod error;
mod loader;
mod manager;
pub mod widgets;

pub use config::UiConfig;
pub use error::{Result, UiError};
pub use manager::UiManager;
