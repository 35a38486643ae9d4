//! Terminal client main loop.

use std::sync::Arc;

use rustyline::{
    Context, Editor, Helper, completion::Completer, error::ReadlineError, highlight::Highlighter,
    hint::Hinter, history::DefaultHistory, validate::Validator,
};
use tokio::sync::mpsc;

use studyhall_server::domain::{Room, RoomId};

use crate::{
    config::ClientConfig,
    error::ChatError,
    infrastructure::RemoteBackend,
    port::RoomDirectory,
    session::{RoomSessionController, SessionPorts},
};

use super::{
    command::{Command, HELP},
    render::{format_room, render_update},
};

/// Connect to the server and run the interactive session until `/quit`
pub async fn run(config: ClientConfig) -> Result<(), ChatError> {
    let backend = Arc::new(RemoteBackend::new(config.server_url(), config.token.clone())?);
    let me = backend.whoami().await?;
    let rooms = backend.list_rooms().await?;
    tracing::info!("Connected to {} as {}", config.server_url(), me.id);

    println!("Signed in as {} ({}).", me.name, me.id);
    print_rooms(&rooms);
    println!("{HELP}");

    let mut controller =
        RoomSessionController::new(SessionPorts::from_backend(backend.clone()), me);
    if let Some(room) = config.room.as_deref() {
        join(&mut controller, &rooms, room).await;
    }

    let mut terminal = spawn_line_reader();
    loop {
        tokio::select! {
            event = terminal.recv() => {
                let line = match event {
                    Some(InputEvent::Edited(text)) => {
                        if !text.starts_with('/') {
                            controller.input_changed(&text);
                        }
                        continue;
                    }
                    Some(InputEvent::Line(line)) => line,
                    None => break,
                };
                match Command::parse(&line) {
                    Command::Quit => break,
                    Command::Rooms => print_rooms(&rooms),
                    Command::Join(room) => join(&mut controller, &rooms, &room).await,
                    Command::Leave => {
                        controller.close();
                        println!("Left the room.");
                    }
                    Command::Send(text) => {
                        if controller.room_id().is_none() {
                            println!("Join a room first: /join <room>");
                            continue;
                        }
                        controller.set_draft(&text);
                        controller.submit();
                    }
                    Command::Unknown(input) => println!("Unknown command: {input}. {HELP}"),
                    Command::Empty => {}
                }
            }
            update = controller.next_update() => {
                for line in render_update(&controller, &update) {
                    println!("{line}");
                }
            }
        }
    }

    controller.close();
    println!("Bye.");
    Ok(())
}

async fn join(controller: &mut RoomSessionController, rooms: &[Room], room: &str) {
    let Some(room) = rooms.iter().find(|r| r.id.as_str() == room) else {
        println!("No such room: {room}. Try /rooms.");
        return;
    };
    let room_id: RoomId = room.id.clone();
    controller.open_room(room_id).await;
    if !controller.has_live_feed() {
        println!("! Live updates are unavailable for #{}.", room.id);
    }
}

fn print_rooms(rooms: &[Room]) {
    println!("Rooms:");
    for room in rooms {
        println!("{}", format_room(room));
    }
}

/// Terminal input, in the order the user produced it
#[derive(Debug, PartialEq, Eq)]
enum InputEvent {
    /// The line being composed changed
    Edited(String),
    /// A finished line
    Line(String),
}

/// Reports the line under edit on every refresh; shows no hints.
struct EditReporter {
    events: mpsc::UnboundedSender<InputEvent>,
}

impl Hinter for EditReporter {
    type Hint = String;

    fn hint(&self, line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let _ = self.events.send(InputEvent::Edited(line.to_string()));
        None
    }
}

impl Completer for EditReporter {
    type Candidate = String;
}

impl Highlighter for EditReporter {}

impl Validator for EditReporter {}

impl Helper for EditReporter {}

/// Read input on a blocking thread and hand it to the async loop
fn spawn_line_reader() -> mpsc::UnboundedReceiver<InputEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let mut editor = match Editor::<EditReporter, DefaultHistory>::new() {
            Ok(editor) => editor,
            Err(e) => {
                tracing::error!("Failed to start line editor: {}", e);
                return;
            }
        };
        editor.set_helper(Some(EditReporter { events: tx.clone() }));
        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    if tx.send(InputEvent::Line(line)).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                    let _ = tx.send(InputEvent::Line("/quit".to_string()));
                    break;
                }
                Err(e) => {
                    tracing::error!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    });
    rx
}
