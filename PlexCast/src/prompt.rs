//! Interactive terminal prompts.

use std::io::{self, Write};

/// Username from the flag, or read from the terminal.
pub fn username(flag: Option<String>) -> io::Result<String> {
    if let Some(username) = flag {
        if !username.is_empty() {
            return Ok(username);
        }
    }

    print!("Plex username: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();
    if input.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty username"));
    }
    Ok(input.to_string())
}

/// Password from the flag, or prompted without echo.
pub fn password(flag: Option<String>) -> io::Result<String> {
    if let Some(password) = flag {
        if !password.is_empty() {
            return Ok(password);
        }
    }
    rpassword::prompt_password("Plex password: ")
}

/// Numbered menu. Prints `title` and the 1-based entries, then reads a
/// selection, re-prompting until it is valid. Returns the 0-based index.
pub fn pick(title: &str, labels: &[String]) -> io::Result<usize> {
    println!("{}", title);
    for (index, label) in labels.iter().enumerate() {
        println!("  [{}] {}", index + 1, label);
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no selection"));
        }

        match input.trim().parse::<usize>() {
            Ok(choice) if (1..=labels.len()).contains(&choice) => return Ok(choice - 1),
            _ => println!(
                "Please enter a number between 1 and {}",
                labels.len()
            ),
        }
    }
}
