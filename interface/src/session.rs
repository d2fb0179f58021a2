use crate::config::AppConfig;
use crate::error::Result;
use crate::hardware::{ChannelCodeReader, DriveBackend, LightBackend};
use brain::{BatchReport, LogProgress, ShapeDrawer, scan_command};
use log::{debug, info, warn};
use std::sync::mpsc::Sender;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub type Drawer = ShapeDrawer<DriveBackend, LightBackend, LogProgress>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// `Y`: scan another code.
    Restart,
    /// `X`: save the log and quit.
    Exit,
}

impl SessionEvent {
    pub fn from_button(input: &str) -> Option<Self> {
        match input.trim().to_ascii_uppercase().as_str() {
            "Y" => Some(SessionEvent::Restart),
            "X" => Some(SessionEvent::Exit),
            _ => None,
        }
    }
}

/// Reads stdin lines: `y`/`x` become button events, anything else is taken as a
/// decoded code. End of input counts as an exit press.
pub fn spawn_console_input(events: UnboundedSender<SessionEvent>, codes: Sender<String>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match SessionEvent::from_button(&line) {
                    Some(event) => {
                        if events.send(event).is_err() {
                            break;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => {
                        let _ = codes.send(line);
                    }
                },
                Ok(None) => {
                    let _ = events.send(SessionEvent::Exit);
                    break;
                }
                Err(e) => {
                    warn!("stdin read failed: {e}");
                    let _ = events.send(SessionEvent::Exit);
                    break;
                }
            }
        }
    });
}

fn display_header(title: &str) {
    let rule = "=".repeat(88);
    println!("\n{rule}");
    println!("{title:^88}");
    println!("{rule}\n");
}

fn print_menu(config: &AppConfig) {
    display_header("Shape Drawing Program");
    println!("Welcome! This program reads codes to draw squares, triangles and circles.");
    println!("\nHow to Use:");
    println!("  - Present a code containing shape information.");
    println!("  - Input Examples:");
    println!("       S-30 (Square of 30 cm)");
    println!("       T-20-30-40 (Triangle with sides 20, 30, 40 cm)");
    println!("       C-40 (Circle of 40 cm diameter)");
    println!("  - Up to 5 shapes can be given using '&' as a delimiter.");
    println!("       Example: S-30&T-20-30-40");
    println!("\nImportant:");
    println!(
        "  - Side lengths must be between {} cm - {} cm.",
        brain::MIN_SIDE_LENGTH,
        brain::MAX_SIDE_LENGTH
    );
    println!(
        "  - You have {} seconds to present a code.\n",
        config.scan.timeout_secs
    );
}

fn print_report(report: &BatchReport) {
    for rejected in &report.rejected {
        println!("ERROR: {rejected}");
    }
    for (shape, error) in &report.aborted {
        println!("ERROR: {shape} was not finished: {error}");
    }
}

fn print_summary(drawer: &Drawer) {
    display_header("Drawing Log Summary");
    print!("{}", drawer.summarize());
}

/// Drops presses made while scanning or drawing. A closed input still ends in
/// `Exit` because `recv` then returns `None`.
fn discard_stale_events(events: &mut UnboundedReceiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        debug!("Ignoring {event:?} pressed while busy");
    }
}

// The drawer moves into the blocking task and back out again.
pub async fn draw(drawer: Drawer, code: String) -> Result<Drawer> {
    let (drawer, result) = tokio::task::spawn_blocking(move || {
        let mut drawer = drawer;
        let result = drawer.process(&code);
        (drawer, result)
    })
    .await?;

    match result {
        Ok(report) => {
            info!(
                "Batch finished: {} drawn, {} rejected, {} aborted",
                report.drawn.len(),
                report.rejected.len(),
                report.aborted.len()
            );
            print_report(&report);
        }
        Err(e) => println!("\nERROR: {e}"),
    }
    Ok(drawer)
}

pub struct Session {
    config: AppConfig,
    drawer: Drawer,
    reader: ChannelCodeReader,
    events: UnboundedReceiver<SessionEvent>,
}

impl Session {
    pub fn new(
        config: AppConfig,
        drawer: Drawer,
        reader: ChannelCodeReader,
        events: UnboundedReceiver<SessionEvent>,
    ) -> Self {
        Self {
            config,
            drawer,
            reader,
            events,
        }
    }

    pub async fn run(self) -> Result<()> {
        let Session {
            config,
            mut drawer,
            mut reader,
            mut events,
        } = self;

        loop {
            print_menu(&config);

            let timeout = config.scan.timeout();
            let poll_interval = config.scan.poll_interval();
            let (returned, code) = tokio::task::spawn_blocking(move || {
                let code = scan_command(&mut reader, timeout, poll_interval);
                (reader, code)
            })
            .await?;
            reader = returned;

            match code {
                Some(code) => {
                    println!("- Code detected: {code}");
                    drawer = draw(drawer, code).await?;
                    print_summary(&drawer);
                }
                None => println!("No code detected within the given time."),
            }

            discard_stale_events(&mut events);
            println!("\nPress 'Y' to scan another code or 'X' to exit.");
            match events.recv().await {
                Some(SessionEvent::Restart) => println!("\nRestarting..."),
                Some(SessionEvent::Exit) | None => {
                    println!("\nThanks for using the Shape Drawer!");
                    drawer.persist(&config.logging.summary_path)?;
                    return Ok(());
                }
            }
        }
    }
}
