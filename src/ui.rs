// Terminal front end for the chat client.

use anyhow::{Context, Result};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use crate::autosave::AutoSaver;
use crate::chat::{Conversation, Speaker};
use crate::client::{ChatClient, TurnOutcome};
use crate::config::ClientConfig;
use crate::constants;
use crate::quick_replies::{render_panel, Panel, QuickReply};
use crate::sessions::SavedChat;

const HELP: &str = "Commands:
  /<n>              pick quick reply number n
  /new              save this chat and start over
  /history          list saved chats
  /load <id>        save this chat and open a saved one
  /delete <id>      delete a saved chat
  /save             save now
  /storage          show storage & safety tips
  /leftovers        show leftover ideas
  /close            hide open tip panels
  /quit             save and exit";

enum Command<'a> {
    Blank,
    Say(&'a str),
    Pick(usize),
    New,
    History,
    Load(&'a str),
    Delete(&'a str),
    Save,
    Show(Panel),
    Close,
    Help,
    Quit,
    Unknown(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Command::Blank;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Command::Say(line);
    };
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    if let Ok(n) = name.parse::<usize>() {
        return Command::Pick(n);
    }
    match (name, arg.is_empty()) {
        ("new", _) => Command::New,
        ("history", _) => Command::History,
        ("load", false) => Command::Load(arg),
        ("delete", false) => Command::Delete(arg),
        ("save", _) => Command::Save,
        ("storage", _) => Command::Show(Panel::StorageTips),
        ("leftovers", _) => Command::Show(Panel::LeftoverTips),
        ("close", _) => Command::Close,
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        _ => Command::Unknown(line),
    }
}

fn print_fragment(text: &str) {
    print!("{}", text);
    let _ = std::io::stdout().flush();
}

fn print_transcript(conversation: &Conversation) {
    for message in conversation.messages() {
        let who = match message.role {
            Speaker::User => "you",
            Speaker::Assistant => "StudyChef",
        };
        println!("{}: {}", who, message.content.trim_end());
    }
}

fn print_status(conversation: &Conversation) {
    let badges = conversation.preferences().badges();
    if !badges.is_empty() {
        println!("[{}]", badges.join("] ["));
    }
    let panels = conversation.panels();
    if panels.storage_tips {
        println!("{}", render_panel(Panel::StorageTips));
    }
    if panels.leftover_tips {
        println!("{}", render_panel(Panel::LeftoverTips));
    }
    let replies = conversation.quick_replies();
    if !replies.is_empty() {
        println!("Quick responses:");
        for (i, reply) in replies.iter().enumerate() {
            println!("  /{} {}", i + 1, reply.label());
        }
    }
    print!("> ");
    let _ = std::io::stdout().flush();
}

pub fn print_history(chats: &[SavedChat], current: Option<&str>) {
    if chats.is_empty() {
        println!("No saved chats yet");
        return;
    }
    for chat in chats {
        let marker = if Some(chat.id.as_str()) == current { "*" } else { " " };
        println!(
            "{} {}  {}  ({} messages, {})",
            marker,
            chat.id,
            chat.title,
            chat.messages.len(),
            chat.timestamp.format("%Y-%m-%d %H:%M")
        );
    }
}

async fn run_turn(client: &mut ChatClient, input: &str) {
    print!("StudyChef: ");
    let outcome = client.submit(input, print_fragment).await;
    println!();
    if outcome == TurnOutcome::Failed {
        // The apology is appended whole rather than streamed.
        println!("{}", constants::CLIENT_APOLOGY);
    }
}

/// Interactive chat loop on stdin/stdout.
pub async fn run_chat(config: ClientConfig) -> Result<()> {
    info!("Chat client using relay {}", config.chat_endpoint());
    let mut client = ChatClient::new(&config);
    let mut autosave = AutoSaver::spawn(config.autosave_quiet);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("StudyChef - budget-friendly cooking for students! Type /help for commands.");
    print_transcript(client.conversation());
    print_status(client.conversation());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                match parse_command(&line) {
                    Command::Blank => {}
                    Command::Say(text) => run_turn(&mut client, text).await,
                    Command::Pick(n) => {
                        let replies = client.conversation().quick_replies();
                        match n.checked_sub(1).and_then(|i| replies.get(i)) {
                            Some(QuickReply::Send(text)) => {
                                println!("you: {}", text);
                                run_turn(&mut client, text).await;
                            }
                            Some(reply @ QuickReply::Show(..)) => {
                                client.choose(reply, print_fragment).await;
                            }
                            None => println!("No quick reply number {}", n),
                        }
                    }
                    Command::New => {
                        client.new_chat().context("Failed to save chat")?;
                        print_transcript(client.conversation());
                    }
                    Command::History => {
                        print_history(client.store().chats(), client.conversation().current_chat_id());
                    }
                    Command::Load(id) => match client.load_chat(id) {
                        Ok(()) => print_transcript(client.conversation()),
                        Err(e) => println!("{}", e),
                    },
                    Command::Delete(id) => match client.delete_chat(id) {
                        Ok(()) => println!("Deleted {}", id),
                        Err(e) => println!("{}", e),
                    },
                    Command::Save => match client.save_current() {
                        Ok(Some(id)) => println!("Saved as {}", id),
                        Ok(None) => println!("Nothing to save yet"),
                        Err(e) => println!("{}", e),
                    },
                    Command::Show(panel) => {
                        client.open_panel(panel);
                    }
                    Command::Close => {
                        client.close_panel(Panel::StorageTips);
                        client.close_panel(Panel::LeftoverTips);
                    }
                    Command::Help => println!("{}", HELP),
                    Command::Quit => break,
                    Command::Unknown(text) => println!("Unknown command {}; try /help", text),
                }
                autosave.notify(client.conversation().revision());
                print_status(client.conversation());
            }
            Some(revision) = autosave.due() => {
                if let Err(e) = client.autosave(revision) {
                    error!("Auto-save failed: {}", e);
                }
            }
        }
    }

    client.save_current().context("Failed to save chat on exit")?;
    Ok(())
}
