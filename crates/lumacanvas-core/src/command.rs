//! Typed inbound command channel.
//!
//! The page chrome (toolbars, drawers, top bar) talks to the canvas only
//! through [`CanvasCommand`]s pushed into a bounded queue. Commands are
//! fire-and-forget: the sender never waits for the canvas to act on them.
//! Results flow back on the notification bus.

use tokio::sync::mpsc;

use crate::error::CommandError;
use crate::geometry::{Point, Size};

/// Keys the canvas reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    Delete,
    Backspace,
    Char(char),
}

impl KeyPress {
    /// Map a DOM-style key name (`"Delete"`, `"Backspace"`, `"0"`) to a key press.
    pub fn from_key_name(name: &str) -> Option<Self> {
        match name {
            "Delete" => Some(KeyPress::Delete),
            "Backspace" => Some(KeyPress::Backspace),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(KeyPress::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

/// A request from the page chrome to the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasCommand {
    /// Run the AI transform selected by `tool` with a natural-language instruction.
    RunTransform { tool: String, prompt: String },
    /// Step back one history snapshot.
    Undo,
    /// Step forward one history snapshot.
    Redo,
    /// Rasterize the graded image and write it out.
    Export,
    /// Replace the canvas content with new image bytes.
    LoadImage {
        bytes: Vec<u8>,
        file_name: Option<String>,
    },
    /// Keyboard shortcut.
    Key(KeyPress),
    /// Mouse wheel over the canvas.
    Wheel { point: Point, delta_y: f64 },
    /// Pointer drag started on the background.
    DragStart(Point),
    /// Pointer moved while dragging.
    DragMove(Point),
    /// Pointer released or left the canvas.
    DragEnd,
    /// Select the current image.
    SelectImage,
    /// Click on the background.
    ClearSelection,
    /// The host resized the visible area.
    ResizeViewport(Size),
    /// Tear down the editor; cancels in-flight work.
    Close,
}

impl CanvasCommand {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            CanvasCommand::RunTransform { .. } => "run_transform",
            CanvasCommand::Undo => "undo",
            CanvasCommand::Redo => "redo",
            CanvasCommand::Export => "export",
            CanvasCommand::LoadImage { .. } => "load_image",
            CanvasCommand::Key(_) => "key",
            CanvasCommand::Wheel { .. } => "wheel",
            CanvasCommand::DragStart(_) => "drag_start",
            CanvasCommand::DragMove(_) => "drag_move",
            CanvasCommand::DragEnd => "drag_end",
            CanvasCommand::SelectImage => "select_image",
            CanvasCommand::ClearSelection => "clear_selection",
            CanvasCommand::ResizeViewport(_) => "resize_viewport",
            CanvasCommand::Close => "close",
        }
    }
}

/// Sending half held by the page chrome.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: mpsc::Sender<CanvasCommand>,
}

impl CommandSender {
    /// Queue a command without waiting.
    pub fn send(&self, command: CanvasCommand) -> Result<(), CommandError> {
        tracing::trace!("Queueing canvas command {}", command.name());
        self.tx.try_send(command).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => CommandError::Full,
            mpsc::error::TrySendError::Closed(_) => CommandError::Closed,
        })
    }

    pub fn run_transform(
        &self,
        tool: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Result<(), CommandError> {
        self.send(CanvasCommand::RunTransform {
            tool: tool.into(),
            prompt: prompt.into(),
        })
    }

    pub fn undo(&self) -> Result<(), CommandError> {
        self.send(CanvasCommand::Undo)
    }

    pub fn redo(&self) -> Result<(), CommandError> {
        self.send(CanvasCommand::Redo)
    }

    pub fn export(&self) -> Result<(), CommandError> {
        self.send(CanvasCommand::Export)
    }

    /// True once the canvas has stopped receiving.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half owned by the canvas controller.
#[derive(Debug)]
pub struct CommandReceiver {
    rx: mpsc::Receiver<CanvasCommand>,
}

impl CommandReceiver {
    /// Wait for the next command; `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<CanvasCommand> {
        self.rx.recv().await
    }

    /// Take a command if one is already queued.
    pub fn try_recv(&mut self) -> Option<CanvasCommand> {
        self.rx.try_recv().ok()
    }
}

/// Create a bounded command channel.
pub fn command_channel(capacity: usize) -> (CommandSender, CommandReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (CommandSender { tx }, CommandReceiver { rx })
}
