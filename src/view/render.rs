//! Rendering: a pure mapping from [`ViewState`] to a [`Frame`], plus text
//! and HTML presenters for the frame.

use crate::image::AspectRatio;
use crate::view::state::ViewState;
use std::fmt::Write as _;

/// Heading shown above the controls.
pub const TITLE: &str = "AI Image Weaver";
/// Submit label when ready.
pub const SUBMIT_READY_LABEL: &str = "Generate Image";
/// Submit label while a request is in flight.
pub const SUBMIT_BUSY_LABEL: &str = "Weaving...";

/// Data URIs longer than this are shortened in the text presenter.
const TEXT_SRC_PREVIEW_LEN: usize = 64;

/// One aspect-ratio toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatioToggle {
    /// Ratio this toggle selects.
    pub ratio: AspectRatio,
    /// Whether it is the current selection.
    pub selected: bool,
}

/// The submit control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitControl {
    /// Button text.
    pub label: &'static str,
    /// Set while a request is in flight.
    pub disabled: bool,
}

/// What fills the image region. Errors are shown in [`Frame::banner`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Canvas {
    /// Request in flight.
    #[allow(missing_docs)]
    Progress {
        headline: &'static str,
        detail: &'static str,
    },
    /// Generated image, scaled to fit.
    Image {
        /// `data:image/jpeg;base64,...`
        src: String,
        /// Accessible description: the current prompt.
        alt: String,
    },
    /// Nothing to show yet.
    #[allow(missing_docs)]
    Placeholder {
        headline: &'static str,
        detail: &'static str,
    },
}

/// A fully rendered view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Prompt field contents.
    pub prompt: String,
    /// Aspect-ratio toggles, in display order.
    pub ratios: Vec<RatioToggle>,
    /// The submit control.
    pub submit: SubmitControl,
    /// Error banner, shown beside the image region whenever an error is
    /// set.
    pub banner: Option<String>,
    /// The image region.
    pub canvas: Canvas,
}

impl Frame {
    /// Renders the given state. Identical state always yields an identical
    /// frame.
    pub fn render(state: &ViewState) -> Self {
        let loading = state.is_loading();

        let canvas = if loading {
            Canvas::Progress {
                headline: "Weaving your vision...",
                detail: "This can take a moment.",
            }
        } else if let Some(image) = state.image() {
            Canvas::Image {
                src: image.data_uri(),
                alt: state.prompt().to_string(),
            }
        } else {
            Canvas::Placeholder {
                headline: "Your image will appear here",
                detail: "Enter a description to get started.",
            }
        };

        Self {
            prompt: state.prompt().to_string(),
            ratios: AspectRatio::ALL
                .into_iter()
                .map(|ratio| RatioToggle {
                    ratio,
                    selected: ratio == state.aspect_ratio(),
                })
                .collect(),
            submit: SubmitControl {
                label: if loading {
                    SUBMIT_BUSY_LABEL
                } else {
                    SUBMIT_READY_LABEL
                },
                disabled: loading,
            },
            banner: state.error().map(str::to_string),
            canvas,
        }
    }

    /// Plain-text presentation for a terminal.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== {TITLE} ==");
        let prompt = if self.prompt.is_empty() {
            "(empty)"
        } else {
            self.prompt.as_str()
        };
        let _ = writeln!(out, "Prompt: {prompt}");

        let ratios: Vec<String> = self
            .ratios
            .iter()
            .map(|t| {
                if t.selected {
                    format!("[{}]", t.ratio)
                } else {
                    format!(" {} ", t.ratio)
                }
            })
            .collect();
        let _ = writeln!(out, "Aspect ratio: {}", ratios.join(" "));

        if self.submit.disabled {
            let _ = writeln!(out, "< {} > (disabled)", self.submit.label);
        } else {
            let _ = writeln!(out, "< {} >", self.submit.label);
        }
        if let Some(message) = &self.banner {
            let _ = writeln!(out, "Error: {message}");
        }
        out.push_str("--\n");

        match &self.canvas {
            Canvas::Progress { headline, detail } | Canvas::Placeholder { headline, detail } => {
                let _ = writeln!(out, "{headline}");
                let _ = writeln!(out, "{detail}");
            }
            Canvas::Image { src, alt } => {
                let _ = writeln!(out, "Image: {alt}");
                let _ = writeln!(out, "src: {}", preview(src));
            }
        }
        out
    }

    /// HTML fragment presentation.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        out.push_str("<section class=\"weaver\">\n");
        let _ = writeln!(out, "  <h1>{TITLE}</h1>");
        let _ = writeln!(
            out,
            "  <textarea id=\"prompt\" rows=\"4\">{}</textarea>",
            escape_html(&self.prompt)
        );

        out.push_str("  <div class=\"ratios\">\n");
        for toggle in &self.ratios {
            let _ = writeln!(
                out,
                "    <button class=\"ratio\" aria-pressed=\"{}\">{}</button>",
                toggle.selected, toggle.ratio
            );
        }
        out.push_str("  </div>\n");

        let disabled = if self.submit.disabled { " disabled" } else { "" };
        let _ = writeln!(
            out,
            "  <button id=\"generate\"{disabled}>{}</button>",
            self.submit.label
        );

        if let Some(message) = &self.banner {
            let _ = writeln!(
                out,
                "  <div class=\"error\" role=\"alert\"><strong>Error:</strong> {}</div>",
                escape_html(message)
            );
        }

        out.push_str("  <div class=\"canvas\">\n");
        match &self.canvas {
            Canvas::Progress { headline, detail } => {
                let _ = writeln!(
                    out,
                    "    <div class=\"progress\" role=\"status\"><p>{headline}</p><p>{detail}</p></div>"
                );
            }
            Canvas::Image { src, alt } => {
                let _ = writeln!(
                    out,
                    "    <img src=\"{}\" alt=\"{}\" style=\"object-fit: contain\">",
                    escape_html(src),
                    escape_html(alt)
                );
            }
            Canvas::Placeholder { headline, detail } => {
                let _ = writeln!(
                    out,
                    "    <div class=\"placeholder\"><h2>{headline}</h2><p>{detail}</p></div>"
                );
            }
        }
        out.push_str("  </div>\n</section>\n");
        out
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}

fn preview(src: &str) -> String {
    if src.chars().count() <= TEXT_SRC_PREVIEW_LEN {
        return src.to_string();
    }
    let head: String = src.chars().take(TEXT_SRC_PREVIEW_LEN).collect();
    format!("{head}... ({} chars)", src.len())
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
