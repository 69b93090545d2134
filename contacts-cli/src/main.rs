use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use clap::Parser;
use contacts_client::{ContactsClient, NewContact};
use uuid::Uuid;

const TOKEN_FILE: &str = ".contacts_token";

#[derive(Parser, Debug)]
struct Cli {
    #[clap(short, long, default_value = "http://127.0.0.1:8080")]
    server: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    Register {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    Login {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },
    Logout,
    List,
    Create {
        #[clap(long)]
        first_name: String,
        #[clap(long)]
        last_name: String,
        #[clap(long)]
        phone: String,
    },
    Update {
        id: Uuid,
        #[clap(long)]
        first_name: Option<String>,
        #[clap(long)]
        last_name: Option<String>,
        #[clap(long)]
        phone: Option<String>,
    },
    Delete {
        id: Uuid,
    },
}

fn load_token(client: &mut ContactsClient) -> anyhow::Result<()> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(());
    }
    let token = fs::read_to_string(TOKEN_FILE).context("reading token file")?;
    let token = token.trim();
    if !token.is_empty() {
        client.set_token(token.to_string());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let mut client = ContactsClient::connect(&args.server)?;
    load_token(&mut client)?;

    match args.command {
        Command::Register { email, password } => {
            client.register(&email, &password).await?;
            println!("Registered {email}. Run `login` to get a token.");
        }
        Command::Login { email, password } => {
            let token = client.login(&email, &password).await?;
            fs::write(TOKEN_FILE, token).context("writing token file")?;
            println!("Logged in as {email}");
        }
        Command::Logout => {
            if client.token().is_some() {
                if let Err(err) = client.logout().await {
                    eprintln!("Server did not acknowledge logout: {err}");
                }
            }
            if Path::new(TOKEN_FILE).exists() {
                fs::remove_file(TOKEN_FILE).context("removing token file")?;
            }
            println!("Logged out");
        }
        Command::List => {
            let contacts = client.list_contacts().await?;
            println!("Contacts ({})", contacts.len());
            for contact in contacts {
                println!("- {contact}");
            }
        }
        Command::Create {
            first_name,
            last_name,
            phone,
        } => {
            let contact = client
                .create_contact(&NewContact {
                    first_name: Some(first_name),
                    last_name: Some(last_name),
                    phone: Some(phone),
                })
                .await?;
            println!("Contact created: {contact}");
        }
        Command::Update {
            id,
            first_name,
            last_name,
            phone,
        } => {
            let changes = NewContact {
                first_name,
                last_name,
                phone,
            };
            if changes.first_name.is_none() && changes.last_name.is_none() && changes.phone.is_none()
            {
                bail!("nothing to update: pass --first-name, --last-name or --phone");
            }
            let contact = client.update_contact(id, &changes).await?;
            println!("Contact updated: {contact}");
        }
        Command::Delete { id } => {
            client.delete_contact(id).await?;
            println!("Contact deleted");
        }
    }

    Ok(())
}
