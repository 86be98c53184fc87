use clap::Parser;
use owo_colors::OwoColorize;
use std::io::{self, Write};
use std::path::Path;
use tlox::cli::{generate_completions, Args, Commands};
use tlox::config::AppConfig;
use tlox::diagnostic::render_diagnostics;
use tlox::format::program_to_json;
use tlox::interpreter::{Interpreter, TokenParser};
use tlox::lexer::scan;

// sysexits-style codes the shell can distinguish: bad input vs bad run.
const EXIT_PARSE_ERROR: i32 = 65;
const EXIT_RUNTIME_ERROR: i32 = 70;

fn main() {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return;
    }

    let config = AppConfig::from_args(&args);

    verbose_log(&config, "Starting tlox");

    if let Some(script) = &args.script {
        verbose_log(&config, &format!("Reading script: {}", script.display()));
        let source = match read_file(script) {
            Ok(source) => source,
            Err(e) => {
                error_message(&config, &e);
                std::process::exit(1);
            }
        };
        let code = run_script(&source, &script.display().to_string(), &args, &config);
        std::process::exit(code);
    }

    if let Some(source) = &args.eval {
        verbose_log(&config, "Running source from command line");
        let code = run_script(source, "<eval>", &args, &config);
        std::process::exit(code);
    }

    run_repl(&config);
}

fn run_script(source: &str, file_name: &str, args: &Args, config: &AppConfig) -> i32 {
    let tokens = match scan(source) {
        Ok(tokens) => tokens,
        Err(diagnostics) => {
            eprint!(
                "{}",
                render_diagnostics(source, file_name, &diagnostics, config.color_enabled)
            );
            return EXIT_PARSE_ERROR;
        }
    };
    verbose_log(config, &format!("Scanned {} tokens", tokens.len()));

    let mut parser = TokenParser::new(tokens);
    let result = parser.parse();
    let had_parse_error = !result.errors.is_empty();
    if had_parse_error {
        let diagnostics: Vec<_> = result.errors.iter().map(|e| e.to_diagnostic()).collect();
        eprint!(
            "{}",
            render_diagnostics(source, file_name, &diagnostics, config.color_enabled)
        );
    }

    if args.dump_ast {
        if had_parse_error {
            return EXIT_PARSE_ERROR;
        }
        let dump = program_to_json(&result.statements);
        println!("{}", serde_json::to_string_pretty(&dump).unwrap());
        return 0;
    }

    verbose_log(
        config,
        &format!("Executing {} statements", result.statements.len()),
    );

    // Statements that survived recovery still run; the exit code keeps
    // reporting the parse failure.
    let mut interpreter = Interpreter::new();
    if let Err(error) = interpreter.interpret(&result.statements) {
        eprint!(
            "{}",
            render_diagnostics(
                source,
                file_name,
                &[error.to_diagnostic()],
                config.color_enabled
            )
        );
        return if had_parse_error {
            EXIT_PARSE_ERROR
        } else {
            EXIT_RUNTIME_ERROR
        };
    }

    if had_parse_error {
        EXIT_PARSE_ERROR
    } else {
        0
    }
}

fn run_repl(config: &AppConfig) {
    if config.verbose {
        verbose_log(config, "Entering interactive mode");
    } else {
        println!("tlox {}", env!("CARGO_PKG_VERSION"));
        println!("Type statements to run them. Exit with Ctrl+D or 'exit'.");
        println!();
    }

    let mut interpreter = Interpreter::new();

    loop {
        print!("tlox> ");
        io::stdout().flush().unwrap();

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                error_message(config, &format!("Error reading input: {}", e));
                break;
            }
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "exit" || trimmed == "quit" {
            break;
        }

        run_line(trimmed, &mut interpreter, config);
    }
}

fn run_line(source: &str, interpreter: &mut Interpreter, config: &AppConfig) {
    let tokens = match scan(source) {
        Ok(tokens) => tokens,
        Err(diagnostics) => {
            eprint!(
                "{}",
                render_diagnostics(source, "repl", &diagnostics, config.color_enabled)
            );
            return;
        }
    };

    let mut parser = TokenParser::new(tokens);
    let result = parser.parse();
    if !result.errors.is_empty() {
        // A line that does not parse is reported and never executed; the
        // session carries on either way.
        let diagnostics: Vec<_> = result.errors.iter().map(|e| e.to_diagnostic()).collect();
        eprint!(
            "{}",
            render_diagnostics(source, "repl", &diagnostics, config.color_enabled)
        );
        return;
    }

    if let Err(error) = interpreter.interpret(&result.statements) {
        eprint!(
            "{}",
            render_diagnostics(
                source,
                "repl",
                &[error.to_diagnostic()],
                config.color_enabled
            )
        );
    }
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

fn verbose_log(config: &AppConfig, message: &str) {
    if config.verbose {
        eprintln!("[tlox:debug] {}", message);
    }
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
