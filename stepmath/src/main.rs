use rustyline::{error::ReadlineError, DefaultEditor};
use std::io::{self, IsTerminal, Read};
use stepmath::{
    canonicalize, encode_content, render_presentation, error::Error, Notation, Parser,
};

/// Parses the given input string and prints all three renderings of the tree, or reports the
/// parse failure to stderr.
fn show(input: &str, notation: Notation) {
    let result = Parser::new(input, notation)
        .parse_full()
        .map_err(Error::from);

    match result {
        Ok(expr) => {
            let expr = canonicalize(expr);
            println!("linear:       {}", expr);
            println!("content:      {}", encode_content(&expr));
            println!("presentation: {}", render_presentation(&expr));
        },
        Err(err) => err.report_to_stderr(input),
    }
}

fn main() {
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    if !args.is_empty() {
        // parse the expression given on the command line
        show(&args.join(" "), Notation::Extended);
    } else if !io::stdin().is_terminal() {
        // read expressions from stdin, one per line
        let mut input = String::new();
        if io::stdin().read_to_string(&mut input).is_err() {
            eprintln!("failed to read stdin");
            return;
        }
        for line in input.lines() {
            if !line.trim().is_empty() {
                show(line, Notation::Extended);
            }
        }
    } else {
        // run the interactive shell
        let Ok(mut rl) = DefaultEditor::new() else {
            eprintln!("failed to initialize the line editor");
            return;
        };
        let mut notation = Notation::Extended;

        fn process_line(
            rl: &mut DefaultEditor,
            notation: &mut Notation,
        ) -> Result<(), ReadlineError> {
            let input = rl.readline("> ")?;
            let trimmed = input.trim();
            if trimmed.is_empty() {
                return Ok(());
            }

            rl.add_history_entry(&input)?;

            match trimmed {
                ":basic" => *notation = Notation::Basic,
                ":extended" => *notation = Notation::Extended,
                _ => show(trimmed, *notation),
            }
            Ok(())
        }

        loop {
            if let Err(err) = process_line(&mut rl, &mut notation) {
                match err {
                    ReadlineError::Eof | ReadlineError::Interrupted => (),
                    _ => eprintln!("{}", err),
                }
                break;
            }
        }
    }
}
