use egui::{Color32, RichText, Ui};

use crate::content::markdown::{Block, Span};

fn heading_size(level: u8) -> f32 {
    match level {
        1 => 22.0,
        2 => 19.0,
        3 => 17.0,
        _ => 15.0,
    }
}

fn rich(span: &Span, size: Option<f32>) -> RichText {
    let mut text = RichText::new(&span.text);
    if let Some(size) = size {
        text = text.size(size).strong();
    }
    if span.strong {
        text = text.strong();
    }
    if span.emphasis {
        text = text.italics();
    }
    if span.strikethrough {
        text = text.strikethrough();
    }
    if span.code {
        text = text.code();
    }
    text
}

fn spans(ui: &mut Ui, spans: &[Span], size: Option<f32>) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for span in spans {
            match &span.link {
                Some(url) => {
                    ui.hyperlink_to(rich(span, size), url);
                }
                None => {
                    ui.label(rich(span, size));
                }
            }
        }
    });
}

/// Lays out an article. Images are drawn by `image(ui, url, alt)` so the
/// caller decides where textures come from.
pub fn show_blocks(ui: &mut Ui, blocks: &[Block], mut image: impl FnMut(&mut Ui, &str, &str)) {
    let mut index = 0;
    while index < blocks.len() {
        match &blocks[index] {
            Block::Heading { level, spans: runs } => {
                ui.add_space(6.0);
                spans(ui, runs, Some(heading_size(*level)));
            }
            Block::Paragraph(runs) => {
                spans(ui, runs, None);
                ui.add_space(4.0);
            }
            Block::ListItem { depth, marker, spans: runs } => {
                ui.horizontal_wrapped(|ui| {
                    ui.add_space(*depth as f32 * 16.0);
                    ui.label(format!("{} ", marker));
                    spans(ui, runs, None);
                });
            }
            Block::Quote(runs) => {
                egui::Frame::none()
                    .fill(Color32::from_gray(245))
                    .inner_margin(egui::Margin::symmetric(8.0, 4.0))
                    .show(ui, |ui| spans(ui, runs, None));
            }
            Block::Code(code) => {
                ui.code(code.trim_end());
            }
            Block::Image { url, alt } => image(ui, url, alt),
            Block::TableRow { .. } => {
                let start = index;
                while matches!(blocks.get(index + 1), Some(Block::TableRow { .. })) {
                    index += 1;
                }
                egui::Grid::new(("article-table", start))
                    .striped(true)
                    .show(ui, |ui| {
                        for block in &blocks[start..=index] {
                            if let Block::TableRow { cells, header } = block {
                                for cell in cells {
                                    let text = RichText::new(cell);
                                    ui.label(if *header { text.strong() } else { text });
                                }
                                ui.end_row();
                            }
                        }
                    });
            }
            Block::Rule => {
                ui.separator();
            }
        }
        index += 1;
    }
}
