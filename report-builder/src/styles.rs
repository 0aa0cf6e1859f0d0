//! Cell formats shared by both sheets.

use claim::TestStatus;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder};

const RED: u32 = 0xFF0000;
const DARK_RED: u32 = 0x8B0000;
const ORANGE: u32 = 0xFFE599;
const GREEN: u32 = 0x90EE90;
const BLUE: u32 = 0xAED6F1;
const CYAN: u32 = 0x00FFFF;
const YELLOW: u32 = 0xFFFFCC;
const LIGHT_GRAY: u32 = 0xD3D3D3;
const LINK_BLUE: u32 = 0x0000FF;

const FONT: &str = "Arial";

fn base() -> Format {
    Format::new().set_font_name(FONT)
}

fn bordered(format: Format) -> Format {
    format
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(LIGHT_GRAY))
}

fn status_fill(status: TestStatus) -> Option<u32> {
    match status {
        TestStatus::Failed => Some(RED),
        TestStatus::Error => Some(DARK_RED),
        TestStatus::Skipped => Some(ORANGE),
        TestStatus::Passed => Some(GREEN),
        TestStatus::Unknown => None,
    }
}

fn with_fill(format: Format, fill: Option<u32>) -> Format {
    match fill {
        Some(rgb) => format.set_background_color(Color::RGB(rgb)),
        None => format,
    }
}

pub struct Styles {
    pub header: Format,
    pub version_header: Format,
    pub total_label: Format,
    pub job_label: Format,
    pub version_label: Format,
    pub value: Format,
    pub link: Format,
    pub cell: Format,
    pub category_cell: Format,
    pub count: Format,
    status_cells: [Format; 5],
    status_labels: [Format; 5],
}

impl Styles {
    pub fn new() -> Self {
        let status_cells = TestStatus::ALL.map(|status| {
            with_fill(
                bordered(base().set_align(FormatAlign::Center)),
                status_fill(status),
            )
        });
        let status_labels = TestStatus::ALL
            .map(|status| with_fill(bordered(base().set_bold()), status_fill(status)));

        Self {
            header: base()
                .set_bold()
                .set_background_color(Color::RGB(BLUE))
                .set_border(FormatBorder::Medium)
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
            version_header: base()
                .set_bold()
                .set_background_color(Color::RGB(GREEN))
                .set_align(FormatAlign::Center),
            total_label: bordered(base().set_bold().set_background_color(Color::RGB(CYAN))),
            job_label: base().set_bold().set_background_color(Color::RGB(YELLOW)),
            version_label: bordered(base().set_background_color(Color::RGB(YELLOW))),
            value: base().set_bold().set_align(FormatAlign::Left),
            link: base()
                .set_font_color(Color::RGB(LINK_BLUE))
                .set_underline(rust_xlsxwriter::FormatUnderline::Single),
            cell: base().set_text_wrap().set_align(FormatAlign::Top),
            category_cell: base()
                .set_text_wrap()
                .set_align(FormatAlign::Top)
                .set_font_color(Color::RGB(LINK_BLUE)),
            count: base(),
            status_cells,
            status_labels,
        }
    }

    /// Centered, colored cell for the State column.
    pub fn status(&self, status: TestStatus) -> &Format {
        &self.status_cells[status.sort_rank() as usize]
    }

    /// Bold, colored label for the summary block.
    pub fn status_label(&self, status: TestStatus) -> &Format {
        &self.status_labels[status.sort_rank() as usize]
    }
}

impl Default for Styles {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_formats_indexed_by_rank() {
        for status in TestStatus::ALL {
            assert_eq!(TestStatus::ALL[status.sort_rank() as usize], status);
        }
    }

    #[test]
    fn test_only_unknown_has_no_fill() {
        let unfilled: Vec<TestStatus> = TestStatus::ALL
            .into_iter()
            .filter(|s| status_fill(*s).is_none())
            .collect();
        assert_eq!(unfilled, vec![TestStatus::Unknown]);
    }
}
