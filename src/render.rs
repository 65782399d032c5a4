//! Text rendering of a roadmap board.

use crate::models::{Color, Feature, Quarter};
use crate::store::Roadmap;

const DONE: &str = "[x]";
const OPEN: &str = "[ ]";
const SWATCH: char = '■';

const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// ANSI styling: colored swatches, bold open features, dim descriptions.
    pub styled: bool,
    pub descriptions: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            styled: false,
            descriptions: true,
        }
    }
}

/// Render every quarter as a header followed by its features.
///
/// Example output:
/// ```text
/// Q1 2025  Jan 01 - Mar 31
/// ├── [x] ■ Planning & Design  (feature_web_0_0)
/// │         Implementation of Planning & Design
/// └── [ ] ■ Backend Setup  (feature_web_0_1)
///           Implementation of Backend Setup
/// ```
pub fn render_roadmap(roadmap: &Roadmap, options: RenderOptions) -> String {
    if roadmap.is_empty() {
        return "(no quarters)\n".to_string();
    }

    let mut output = String::new();
    for (i, quarter) in roadmap.quarters().iter().enumerate() {
        if i > 0 {
            output.push('\n');
        }
        render_quarter(&mut output, quarter, options);
    }
    output
}

fn render_quarter(output: &mut String, quarter: &Quarter, options: RenderOptions) {
    if options.styled {
        output.push_str(BOLD);
        output.push_str(&quarter.name());
        output.push_str(RESET);
    } else {
        output.push_str(&quarter.name());
    }
    output.push_str("  ");
    output.push_str(&quarter.date_range());
    output.push('\n');

    if quarter.features.is_empty() {
        output.push_str("└── (no features)\n");
        return;
    }

    for (i, feature) in quarter.features.iter().enumerate() {
        let is_last = i == quarter.features.len() - 1;
        render_feature(output, feature, is_last, options);
    }
}

fn render_feature(output: &mut String, feature: &Feature, is_last: bool, options: RenderOptions) {
    let branch = if is_last { "└── " } else { "├── " };
    output.push_str(branch);
    output.push_str(if feature.completed { DONE } else { OPEN });
    output.push(' ');
    output.push_str(&swatch(&feature.color, options.styled));
    output.push(' ');

    // Open features stand out; finished ones read as plain text.
    if options.styled && !feature.completed {
        output.push_str(BOLD);
        output.push_str(&feature.title);
        output.push_str(RESET);
    } else {
        output.push_str(&feature.title);
    }
    output.push_str("  (");
    output.push_str(&feature.id);
    output.push_str(")\n");

    if options.descriptions && !feature.description.is_empty() {
        let continuation = if is_last { "    " } else { "│   " };
        for line in feature.description.lines() {
            output.push_str(continuation);
            output.push_str("      ");
            if options.styled {
                output.push_str(DIM);
                output.push_str(line);
                output.push_str(RESET);
            } else {
                output.push_str(line);
            }
            output.push('\n');
        }
    }
}

fn swatch(color: &Color, styled: bool) -> String {
    if styled {
        let (r, g, b) = color.rgb();
        format!("\x1b[38;2;{};{};{}m{}{}", r, g, b, SWATCH, RESET)
    } else {
        SWATCH.to_string()
    }
}
