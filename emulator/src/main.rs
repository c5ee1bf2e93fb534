mod board;
mod script;
mod session;

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::process;

use session::{Reply, Session};

fn main() -> io::Result<()> {
    let mut args = env::args().skip(1);
    let script_path = args.next();
    if args.next().is_some() {
        eprintln!("Usage: guard-emulator [script]");
        process::exit(2);
    }

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    let mut session = Session::new();

    if let Some(path) = script_path {
        let script = fs::read_to_string(&path).unwrap_or_else(|err| {
            eprintln!("cannot read {path}: {err}");
            process::exit(1);
        });
        return run_script(&mut session, &script, &mut writer);
    }

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    writeln!(
        writer,
        "Environment guard emulator ready. Type `help` for commands or `exit` to quit."
    )?;

    loop {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        match session.handle_command(&line) {
            Reply::Lines(responses) => {
                for response in responses {
                    writeln!(writer, "{response}")?;
                }
            }
            Reply::Exit => {
                writeln!(writer, "Session closed.")?;
                break;
            }
        }
    }

    Ok(())
}

/// Replays a script, echoing each command ahead of its output.
fn run_script<W: Write>(session: &mut Session, script: &str, writer: &mut W) -> io::Result<()> {
    for line in script.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        writeln!(writer, "> {trimmed}")?;
        match session.handle_command(trimmed) {
            Reply::Lines(responses) => {
                for response in responses {
                    writeln!(writer, "{response}")?;
                }
            }
            Reply::Exit => break,
        }
    }
    Ok(())
}
