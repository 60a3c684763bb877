use clap::Parser;
use portfolio_core::widget::{ChatWidget, HttpRelayTransport, Speaker, TranscriptEntry};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command line arguments
#[derive(Parser, Debug)]
#[clap(name = "portfolio-chat")]
#[clap(about = "Chat with the portfolio assistant from a terminal")]
struct Args {
    /// Site root serving /api/chat
    #[clap(long, default_value = "http://localhost:8000")]
    url: String,

    /// Show the quick-reply suggestions while they are on offer
    #[clap(long)]
    quick_replies: bool,
}

/// One line of user input
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Toggle,
    Quick(usize),
    Quit,
    Say(String),
    Empty,
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    match line {
        "" => Command::Empty,
        "/open" | "/close" => Command::Toggle,
        "/quit" | "/exit" => Command::Quit,
        _ => match line.strip_prefix("/quick ") {
            Some(index) => match index.trim().parse::<usize>() {
                Ok(n) if n > 0 => Command::Quick(n - 1),
                _ => Command::Say(line.to_string()),
            },
            None => Command::Say(line.to_string()),
        },
    }
}

fn render(entry: &TranscriptEntry) -> String {
    let who = match entry.speaker {
        Speaker::User => "you",
        Speaker::Assistant => "assistant",
    };
    format!(
        "[{}] {}: {}",
        entry.created_at.format("%H:%M"),
        who,
        entry.content
    )
}

async fn print_line(stdout: &mut tokio::io::Stdout, line: &str) -> anyhow::Result<()> {
    stdout.write_all(line.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_chat=info,portfolio_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let transport = HttpRelayTransport::new(&args.url)?;
    debug!("Relay endpoint: {}", transport.endpoint());
    let widget = ChatWidget::new(transport);

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown = 0;

    print_line(
        &mut stdout,
        "Commands: /open toggles the widget, /quick N picks a suggestion, /quit leaves.",
    )
    .await?;

    loop {
        let transcript = widget.transcript();
        if widget.is_open() {
            for entry in &transcript[shown..] {
                print_line(&mut stdout, &render(entry)).await?;
            }
            shown = transcript.len();

            if args.quick_replies {
                for (i, reply) in widget.quick_replies().iter().enumerate() {
                    print_line(&mut stdout, &format!("  /quick {}  {}", i + 1, reply)).await?;
                }
            }
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_command(&line) {
            // Enter on an empty line sends whatever a quick reply put there
            Command::Empty => {
                widget.submit().await;
            }
            Command::Quit => break,
            Command::Toggle => {
                widget.toggle_open();
                let state = if widget.is_open() { "opened" } else { "closed" };
                print_line(&mut stdout, &format!("(widget {})", state)).await?;
            }
            Command::Quick(index) => match widget.quick_replies().get(index) {
                Some(reply) => {
                    widget.select_quick_reply(*reply);
                    print_line(
                        &mut stdout,
                        &format!("(input set to \"{}\", press Enter to send)", reply),
                    )
                    .await?;
                }
                None => print_line(&mut stdout, "(no such suggestion)").await?,
            },
            Command::Say(text) => {
                if !widget.is_open() {
                    widget.toggle_open();
                }
                widget.set_input(text);
                widget.submit().await;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("  "), Command::Empty);
        assert_eq!(parse_command("/open"), Command::Toggle);
        assert_eq!(parse_command("/quit"), Command::Quit);
        assert_eq!(parse_command("/quick 2"), Command::Quick(1));
        assert_eq!(parse_command("/quick 0"), Command::Say("/quick 0".to_string()));
        assert_eq!(parse_command("hello"), Command::Say("hello".to_string()));
    }
}
