//! Tagged console messages and the completion bell

use console::{style, Term};
use std::thread;
use std::time::Duration;

/// Kind of message shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

/// `[INFO] message` / `[ERROR] message`
pub fn format_tagged(kind: MessageKind, message: &str) -> String {
    let tag = match kind {
        MessageKind::Info => style("[INFO]").cyan(),
        MessageKind::Error => style("[ERROR]").yellow(),
    };
    format!("{} {}", tag, message)
}

pub fn print_tagged(kind: MessageKind, message: &str) {
    let line = format_tagged(kind, message);
    match kind {
        MessageKind::Info => println!("{}", line),
        MessageKind::Error => eprintln!("{}", line),
    }
}

pub fn print_start() {
    println!("\n{}", style("==== START ====").green());
}

pub fn print_outcome(success: bool) {
    if success {
        println!("{}", style("==== SUCCESS ====").green());
    } else {
        eprintln!("{}", style("==== FAILURE ====").red());
    }
}

/// Two short bells on success, one on failure.
pub fn beep(success: bool) {
    let term = Term::stdout();
    let rings = if success { 2 } else { 1 };
    for i in 0..rings {
        if i > 0 {
            thread::sleep(Duration::from_millis(150));
        }
        let _ = term.write_str("\x07");
    }
}
