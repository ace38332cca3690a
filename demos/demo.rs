//! Walks through a completing prompt followed by a menu answered first
//! with a line and then with a single key press.

use ansi_term::Color;

use cliprompt::reader::{END_INVISIBLE, START_INVISIBLE};
use cliprompt::{Menu, Options, Prompt, Result};

fn main() -> Result<()> {
    let style = Color::Green.bold();

    // START_INVISIBLE and END_INVISIBLE enclose the color escape sequences
    // so that they do not count toward the width of the prompt.
    let prompt = format!("{start}{prefix}{end}demo> {start}{suffix}{end}",
        start=START_INVISIBLE,
        end=END_INVISIBLE,
        prefix=style.prefix(),
        suffix=style.suffix());

    println!("This is the prompt demo.");
    println!("Press Tab twice for a list of commands. Enter \"stop\" to continue.");

    let commands = Prompt::new(vec!["start", "stop", "list", "print"], "stop", &prompt)?;

    for line in commands.lines() {
        let line = line?;

        if !line.is_empty() {
            println!("received: {}", line);
        }
    }

    println!();
    println!("This is the menu demo. First, enter an option and press Enter.");

    let mut menu = Menu::new(options())?;

    if let Some(action) = menu.choose("> ", false)? {
        println!("chose option \"{}\"", action.call());
    }

    println!();
    println!("Now press a single key.");

    let mut menu = Menu::new(options())?;

    if let Some(action) = menu.choose("", true)? {
        println!("chose option \"{}\"", action.call());
    }

    Ok(())
}

fn options() -> Options<&'static str> {
    Options::new()
        .with("a", "Option A", || "a")
        .with("b", "Option B", || "b")
        .with("c", "Option C", || "c")
}
