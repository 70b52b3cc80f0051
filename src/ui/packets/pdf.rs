//! PDF packets
//!
//! The terminal cannot draw a PDF, so the bytes are written to a temp file
//! owned by the viewer and handed to an external program. With `[pdf] embed`
//! set, the pane shows the document's details instead and the external
//! viewer is only started on request.

use crate::config::PdfConfig;
use crate::error::{Result, UiError};
use crate::packet::{PacketContent, PacketRef};
use crate::tools::{pdf, ExternalProcess, ProcessState};
use ratatui::{layout::Rect, text::Line, widgets::Paragraph, Frame};
use tempfile::NamedTempFile;

use super::{content_as, field_line, wrong_content};
use crate::ui::traits::RenderContext;
use crate::ui::viewer::{
    render_message, ActionRequirement, PacketViewer, PaneContext, ViewerAction,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfState {
    Empty,
    /// Details shown in the pane itself
    Embedded {
        version: Option<String>,
        pages: usize,
        bytes: usize,
    },
    /// Handed to an external viewer
    External { command: String },
    Error(String),
}

pub fn create(packet: &PacketRef, ctx: &PaneContext) -> Result<Box<dyn PacketViewer>> {
    if pdf_bytes(packet).is_none() {
        return Err(wrong_content(packet, "a PDF document"));
    }
    let mut viewer = PdfViewer::new(packet, ctx);
    viewer.refresh();
    Ok(Box::new(viewer))
}

fn pdf_bytes(packet: &PacketRef) -> Option<Vec<u8>> {
    content_as(packet, |c| match c {
        PacketContent::Pdf(data) => Some(data),
        _ => None,
    })
    .map(|d| d.clone())
}

pub struct PdfViewer {
    packet: PacketRef,
    ctx: PaneContext,
    config: PdfConfig,
    state: PdfState,
    // Declared before the temp file so a killed viewer lets go of it first.
    process: Option<ExternalProcess>,
    temp: Option<NamedTempFile>,
}

impl PdfViewer {
    pub fn new(packet: &PacketRef, ctx: &PaneContext) -> Self {
        Self {
            packet: packet.clone(),
            ctx: ctx.clone(),
            config: ctx.prefs.config().pdf.clone(),
            state: PdfState::Empty,
            process: None,
            temp: None,
        }
    }

    pub fn state(&self) -> &PdfState {
        &self.state
    }

    pub fn temp_path(&self) -> Option<&std::path::Path> {
        self.temp.as_ref().map(|t| t.path())
    }

    fn discard_process(&mut self) {
        if let Some(mut process) = self.process.take() {
            if self.config.auto_close {
                process.kill();
            }
        }
    }

    fn launch(&mut self) -> Result<()> {
        let Some(path) = self.temp_path().map(|p| p.to_path_buf()) else {
            return Ok(());
        };
        self.discard_process();
        let process = pdf::launch_viewer(&self.config, &path)?;
        self.state = PdfState::External {
            command: process.command().to_string(),
        };
        self.process = Some(process);
        Ok(())
    }
}

impl PacketViewer for PdfViewer {
    fn packet(&self) -> &PacketRef {
        &self.packet
    }

    fn render(&mut self, f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let theme = ctx.theme;
        match &self.state {
            PdfState::Empty => render_message(f, area, ctx, "This PDF packet is empty.", ""),
            PdfState::Error(why) => {
                render_message(f, area, ctx, "This PDF document cannot be shown.", why)
            }
            PdfState::External { command } => {
                let starting = self.process.as_ref().is_some_and(|p| !p.is_started());
                let title = if starting {
                    format!("{} Starting the external PDF viewer.", ctx.spinner())
                } else {
                    "This PDF document is open in an external viewer.".to_string()
                };
                render_message(f, area, ctx, &title, command)
            }
            PdfState::Embedded {
                version,
                pages,
                bytes,
            } => {
                let lines = vec![
                    Line::raw(""),
                    field_line(theme, "PDF version", version.as_deref().unwrap_or("unknown")),
                    field_line(theme, "Pages", pages.to_string()),
                    field_line(theme, "Size", format!("{bytes} bytes")),
                ];
                f.render_widget(Paragraph::new(lines), area);
            }
        }
    }

    fn refresh(&mut self) {
        // The old viewer may still hold the old temp file open.
        self.discard_process();

        let data = pdf_bytes(&self.packet).unwrap_or_default();
        if data.is_empty() {
            self.temp = None;
            self.state = PdfState::Empty;
            return;
        }

        match pdf::write_temp(&data) {
            Ok(file) => self.temp = Some(file),
            Err(e) => {
                tracing::warn!("Could not write PDF temp file: {}", e);
                self.temp = None;
                self.state = PdfState::Error(
                    "The temporary PDF file could not be created.".to_string(),
                );
                return;
            }
        }

        if self.config.embed {
            self.state = PdfState::Embedded {
                version: pdf::version(&data),
                pages: pdf::page_count(&data),
                bytes: data.len(),
            };
            return;
        }
        if let Err(e) = self.launch() {
            self.state = PdfState::Error(e.to_string());
            self.ctx.report(&e);
        }
    }

    fn packet_type_actions(&self) -> Vec<ViewerAction> {
        vec![
            ViewerAction::new("open-external", "Open Externally", ActionRequirement::TryCommit)
                .enabled(self.temp.is_some()),
        ]
    }

    fn trigger_action(&mut self, id: &str) -> Result<()> {
        if id == "open-external" {
            self.launch()?;
        }
        Ok(())
    }

    fn update_preferences(&mut self) {
        let config = self.ctx.prefs.config().pdf.clone();
        if config != self.config {
            let embed_changed = config.embed != self.config.embed;
            self.config = config;
            if embed_changed {
                self.refresh();
            }
        }
    }

    fn poll(&mut self) {
        let Some(process) = self.process.as_mut() else {
            return;
        };
        match process.poll() {
            ProcessState::Running => {}
            ProcessState::Finished => self.process = None,
            ProcessState::Failed { exit_code } => {
                let command = process.command().to_string();
                self.process = None;
                self.state = PdfState::Error(format!("The viewer {command} failed."));
                self.ctx.report(&UiError::ExternalTool {
                    command,
                    exit_code,
                    detail: String::new(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Packet;
    use crate::ui::viewer::TestContext;

    const TINY: &[u8] = b"%PDF-1.5\n1 0 obj << /Type /Page >>\n%%EOF";

    fn embedding_context() -> TestContext {
        let t = TestContext::new();
        t.ctx.prefs.update(|c| c.pdf.embed = true);
        t
    }

    #[test]
    fn test_embedded_details() {
        let t = embedding_context();
        let packet = Packet::new("doc", PacketContent::Pdf(TINY.to_vec()));
        let mut viewer = PdfViewer::new(&packet, &t.ctx);
        viewer.refresh();
        assert_eq!(
            viewer.state(),
            &PdfState::Embedded {
                version: Some("1.5".to_string()),
                pages: 1,
                bytes: TINY.len(),
            }
        );
        assert!(viewer.packet_type_actions()[0].enabled);
    }

    #[test]
    fn test_temp_file_lives_with_viewer() {
        let t = embedding_context();
        let packet = Packet::new("doc", PacketContent::Pdf(TINY.to_vec()));
        let mut viewer = PdfViewer::new(&packet, &t.ctx);
        viewer.refresh();
        let path = viewer.temp_path().unwrap().to_path_buf();
        assert!(path.exists());
        drop(viewer);
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_packet() {
        let t = embedding_context();
        let packet = Packet::new("doc", PacketContent::Pdf(Vec::new()));
        let mut viewer = PdfViewer::new(&packet, &t.ctx);
        viewer.refresh();
        assert_eq!(viewer.state(), &PdfState::Empty);
        assert!(viewer.temp_path().is_none());
    }

    fn external_context(viewer: &str) -> TestContext {
        let t = TestContext::new();
        t.ctx.prefs.update(|c| {
            c.pdf.embed = false;
            c.pdf.auto_close = true;
            c.pdf.external_viewer = viewer.to_string();
        });
        t
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_viewer_is_reported() {
        if crate::tools::resolve_executable("false").is_err() {
            return;
        }
        let t = external_context("false");
        let packet = Packet::new("doc", PacketContent::Pdf(TINY.to_vec()));
        let mut viewer = PdfViewer::new(&packet, &t.ctx);
        viewer.refresh();
        assert!(matches!(viewer.state(), PdfState::External { .. }));

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while viewer.process.is_some() && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(20));
            viewer.poll();
        }
        assert!(matches!(viewer.state(), PdfState::Error(_)));
        assert!(t.dialogs.last().is_some_and(|r| r.mentions("false")));
    }

    #[cfg(unix)]
    #[test]
    fn test_refresh_replaces_viewer_and_temp_file() {
        if crate::tools::resolve_executable("tail").is_err() {
            return;
        }
        let t = external_context("tail -f");
        let packet = Packet::new("doc", PacketContent::Pdf(TINY.to_vec()));
        let mut viewer = PdfViewer::new(&packet, &t.ctx);
        viewer.refresh();
        let old_path = viewer.temp_path().unwrap().to_path_buf();
        assert!(viewer.process.is_some());

        packet.edit_content(|c| *c = PacketContent::Pdf(b"%PDF-1.7\n%%EOF".to_vec()));
        viewer.refresh();
        let new_path = viewer.temp_path().unwrap().to_path_buf();
        assert_ne!(old_path, new_path);
        assert!(!old_path.exists());
        assert!(viewer.process.is_some());
        assert!(matches!(viewer.state(), PdfState::External { .. }));

        packet.edit_content(|c| *c = PacketContent::Pdf(Vec::new()));
        viewer.refresh();
        assert!(viewer.process.is_none());
        assert_eq!(viewer.state(), &PdfState::Empty);
    }

    #[test]
    fn test_missing_viewer_is_reported() {
        let t = TestContext::new();
        t.ctx
            .prefs
            .update(|c| {
                c.pdf.embed = false;
                c.pdf.external_viewer = "regina-no-such-pdf-viewer".to_string();
            });
        let packet = Packet::new("doc", PacketContent::Pdf(TINY.to_vec()));
        let mut viewer = PdfViewer::new(&packet, &t.ctx);
        viewer.refresh();

        assert!(matches!(viewer.state(), PdfState::Error(_)));
        assert!(t.dialogs.last().is_some_and(|r| r.mentions("regina-no-such-pdf-viewer")));
    }
}
