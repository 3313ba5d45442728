//! Line-oriented interactive session driving a [`GenerationView`].
//!
//! Reads commands from an async line source and writes rendered frames to
//! an async sink. At most one generation is in flight; its result comes
//! back over a channel tagged with the ticket it was issued under.

use crate::error::Result;
use crate::image::AspectRatio;
use crate::view::{settle_join, GenerationView, PendingGeneration, Settled, Ticket};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;

const HELP: &str = "\
Commands:
  <text>           replace the prompt with <text>
  :prompt <text>   replace the prompt (text may be blank or start with ':')
  :ratio <r>       select aspect ratio (1:1, 16:9, 9:16, 4:3, 3:4)
  :generate, :go   generate an image
  :show            show the current view
  :save <path>     write the current image as JPEG
  :html <path>     write the current view as an HTML fragment
  :help            show this help
  :quit            exit
";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the prompt.
    Prompt(String),
    /// Select an aspect ratio.
    Ratio(AspectRatio),
    /// Press submit.
    Generate,
    /// Re-render.
    Show,
    /// Save the current image.
    Save(PathBuf),
    /// Write the current frame as HTML.
    Html(PathBuf),
    /// Print the command list.
    Help,
    /// Leave the session.
    Quit,
}

impl Command {
    /// Parses one input line. Returns `Ok(None)` for an empty line.
    pub fn parse(line: &str) -> std::result::Result<Option<Self>, String> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            return Ok(None);
        }
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Some(Self::Prompt(line.to_string())));
        };

        let (name, arg) = match rest.split_once(' ') {
            Some((name, arg)) => (name, arg),
            None => (rest, ""),
        };

        let command = match name {
            "prompt" => Self::Prompt(arg.to_string()),
            "ratio" => Self::Ratio(arg.parse().map_err(|e| format!("{e}"))?),
            "generate" | "go" => Self::Generate,
            "show" => Self::Show,
            "save" => Self::Save(required_path(name, arg)?),
            "html" => Self::Html(required_path(name, arg)?),
            "help" | "h" | "?" => Self::Help,
            "quit" | "q" | "exit" => Self::Quit,
            other => return Err(format!("unknown command ':{other}' (try :help)")),
        };
        Ok(Some(command))
    }
}

fn required_path(name: &str, arg: &str) -> std::result::Result<PathBuf, String> {
    let arg = arg.trim();
    if arg.is_empty() {
        return Err(format!(":{name} needs a path"));
    }
    Ok(PathBuf::from(arg))
}

enum Step {
    Continue,
    Quit,
}

/// Interactive session over an input and an output stream.
pub struct Session<R, W> {
    view: GenerationView,
    lines: Lines<R>,
    output: W,
    in_flight: Option<AbortHandle>,
    results_tx: mpsc::Sender<(Ticket, Settled)>,
    results_rx: mpsc::Receiver<(Ticket, Settled)>,
}

impl<R, W> Session<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a session around `view`.
    pub fn new(view: GenerationView, input: R, output: W) -> Self {
        let (results_tx, results_rx) = mpsc::channel(4);
        Self {
            view,
            lines: input.lines(),
            output,
            in_flight: None,
            results_tx,
            results_rx,
        }
    }

    /// The view being driven.
    pub fn view(&self) -> &GenerationView {
        &self.view
    }

    /// Consumes the session, returning its output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs until `:quit`, or until input ends and the last in-flight
    /// request has settled.
    pub async fn run(&mut self) -> Result<()> {
        self.render().await?;
        let mut input_open = true;

        loop {
            if !input_open && self.in_flight.is_none() {
                break;
            }

            tokio::select! {
                line = self.lines.next_line(), if input_open => {
                    match line? {
                        Some(line) => {
                            if let Step::Quit = self.handle_line(&line).await? {
                                break;
                            }
                        }
                        None => input_open = false,
                    }
                }
                Some((ticket, settled)) = self.results_rx.recv() => {
                    if self.view.settle(ticket, settled) {
                        self.in_flight = None;
                        self.render().await?;
                    }
                }
                else => break,
            }
        }

        if let Some(task) = self.in_flight.take() {
            task.abort();
        }
        self.output.flush().await?;
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> Result<Step> {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Step::Continue),
            Err(message) => {
                self.write_line(&message).await?;
                return Ok(Step::Continue);
            }
        };

        match command {
            Command::Prompt(text) => {
                self.view.set_prompt(text);
                self.render().await?;
            }
            Command::Ratio(ratio) => {
                self.view.select_aspect_ratio(ratio);
                self.render().await?;
            }
            Command::Generate => {
                // The control is disabled while loading; honour that here.
                if self.view.frame().submit.disabled {
                    tracing::warn!("submit ignored: generation already in progress");
                    self.write_line("A generation is already in progress.").await?;
                    return Ok(Step::Continue);
                }
                if let Some(pending) = self.view.begin() {
                    self.dispatch(pending);
                }
                self.render().await?;
            }
            Command::Show => self.render().await?,
            Command::Save(path) => self.save_image(path).await?,
            Command::Html(path) => {
                let html = self.view.frame().to_html();
                match tokio::fs::write(&path, html).await {
                    Ok(()) => {
                        self.write_line(&format!("Wrote {}", path.display())).await?;
                    }
                    Err(e) => {
                        self.write_line(&format!("Could not write {}: {e}", path.display()))
                            .await?;
                    }
                }
            }
            Command::Help => self.write_line(HELP.trim_end()).await?,
            Command::Quit => return Ok(Step::Quit),
        }
        Ok(Step::Continue)
    }

    fn dispatch(&mut self, pending: PendingGeneration) {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        let ticket = pending.ticket();
        tracing::debug!(generation = ticket.generation(), "dispatching generation");

        let task = tokio::spawn(pending.run());
        self.in_flight = Some(task.abort_handle());

        let tx = self.results_tx.clone();
        tokio::spawn(async move {
            let settled = settle_join(task.await);
            // The receiver lives as long as the session.
            let _ = tx.send((ticket, settled)).await;
        });
    }

    async fn save_image(&mut self, path: PathBuf) -> Result<()> {
        let message = match self.view.state().image() {
            None => "No image to save yet.".to_string(),
            Some(image) => match image.save(&path) {
                Ok(()) => format!("Saved {} ({} bytes)", path.display(), image.size()),
                Err(e) => format!("Could not save {}: {e}", path.display()),
            },
        };
        self.write_line(&message).await
    }

    async fn render(&mut self) -> Result<()> {
        let text = self.view.frame().to_text();
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        self.output.write_all(line.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WeaverError;
    use crate::image::testing::{Reply, ScriptedProvider};
    use crate::image::ImageClient;
    use std::io::Cursor;
    use std::sync::Arc;

    type TestSession = Session<Cursor<Vec<u8>>, Vec<u8>>;

    fn session(
        input: impl Into<String>,
        replies: Vec<Reply>,
    ) -> (TestSession, Arc<ScriptedProvider>) {
        let provider = ScriptedProvider::new(replies);
        let view = GenerationView::new(ImageClient::new(provider.clone()));
        let input = Cursor::new(input.into().into_bytes());
        (Session::new(view, input, Vec::new()), provider)
    }

    async fn run_to_end(
        input: &str,
        replies: Vec<Reply>,
    ) -> (String, GenerationView, Arc<ScriptedProvider>) {
        let (mut session, provider) = session(input, replies);
        session.run().await.unwrap();
        let Session { view, output, .. } = session;
        (String::from_utf8(output).unwrap(), view, provider)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse(""), Ok(None));
        assert_eq!(
            Command::parse("a red fox"),
            Ok(Some(Command::Prompt("a red fox".into())))
        );
        assert_eq!(
            Command::parse("   "),
            Ok(Some(Command::Prompt("   ".into())))
        );
        assert_eq!(
            Command::parse(":prompt :colons: ok"),
            Ok(Some(Command::Prompt(":colons: ok".into())))
        );
        assert_eq!(
            Command::parse(":ratio 9:16"),
            Ok(Some(Command::Ratio(AspectRatio::Portrait)))
        );
        assert_eq!(Command::parse(":go"), Ok(Some(Command::Generate)));
        assert_eq!(Command::parse(":generate\r"), Ok(Some(Command::Generate)));
        assert_eq!(
            Command::parse(":save out.jpg"),
            Ok(Some(Command::Save(PathBuf::from("out.jpg"))))
        );
        assert_eq!(Command::parse(":q"), Ok(Some(Command::Quit)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Command::parse(":ratio 2:1").unwrap_err().contains("2:1"));
        assert!(Command::parse(":save").unwrap_err().contains("path"));
        assert!(Command::parse(":dance").unwrap_err().contains(":dance"));
    }

    #[tokio::test]
    async fn test_generate_and_render_image() {
        let (out, view, provider) = run_to_end(
            "a red fox in snow\n:ratio 16:9\n:go\n",
            vec![Reply::Image("QQ==")],
        )
        .await;

        assert_eq!(
            provider.calls(),
            vec![crate::image::GenerationRequest::new("a red fox in snow")
                .with_aspect_ratio(AspectRatio::Landscape)]
        );
        assert!(out.contains("Weaving your vision..."));
        assert!(out.contains("src: data:image/jpeg;base64,QQ=="));
        assert!(!view.state().is_loading());
    }

    #[tokio::test]
    async fn test_blank_prompt_reports_validation_error() {
        let (out, _, provider) = run_to_end("   \n:go\n", vec![]).await;
        assert!(out.contains("Error: Please enter a description for the image."));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failure_is_rendered() {
        let (out, view, _) = run_to_end(
            "a cat\n:go\n",
            vec![Reply::Fail(WeaverError::Service("quota exceeded".into()))],
        )
        .await;
        assert!(out.contains("Error: Failed to generate image: quota exceeded"));
        assert!(view.state().image().is_none());
    }

    #[tokio::test]
    async fn test_submit_refused_while_loading() {
        let (mut session, provider) = session("", vec![]);

        assert!(matches!(session.handle_line("a cat").await.unwrap(), Step::Continue));
        session.handle_line(":go").await.unwrap();
        assert!(session.view().frame().submit.disabled);
        session.handle_line(":go").await.unwrap();

        session.run().await.unwrap();
        let out = String::from_utf8(session.into_output()).unwrap();
        assert!(out.contains("A generation is already in progress."));
        assert_eq!(provider.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_quit_stops_reading() {
        let (out, _, provider) = run_to_end(":quit\na cat\n:go\n", vec![]).await;
        assert!(!out.contains("a cat"));
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_html() {
        let dir = tempfile::tempdir().unwrap();
        let jpg = dir.path().join("fox.jpg");
        let html = dir.path().join("view.html");

        let input = format!("fox\n:save {}\n:go\n", jpg.display());
        let (mut session, _) = session(input, vec![Reply::Image("/9j/4A==")]);
        session.run().await.unwrap();

        // The image exists only after the request settled, so save again now.
        session
            .handle_line(&format!(":save {}", jpg.display()))
            .await
            .unwrap();
        session
            .handle_line(&format!(":html {}", html.display()))
            .await
            .unwrap();

        let out = String::from_utf8(session.into_output()).unwrap();
        assert!(out.contains("No image to save yet."));
        assert_eq!(std::fs::read(&jpg).unwrap(), vec![0xFF, 0xD8, 0xFF, 0xE0]);
        let fragment = std::fs::read_to_string(&html).unwrap();
        assert!(fragment.contains("src=\"data:image/jpeg;base64,/9j/4A==\""));
        assert!(fragment.contains("alt=\"fox\""));
    }
}
