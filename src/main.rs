//! founderboard CLI
//!
//! Walk an idea through the validation funnel from the terminal.
//!
//! Run with: cargo run -- <command>

use anyhow::{bail, Context, Result};
use founderboard::{
    AdvisorType, ContentGenerator, IdeaProfile, IdentityGateway, SessionEngine, SessionView,
    SqliteIdentity, SqliteStore, Stage, User,
};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    match args[1].as_str() {
        "signup" => {
            let (email, password) = credentials_from(&args)?;
            run_signup(&email, &password)
        }
        "login" => {
            let (email, password) = credentials_from(&args)?;
            run_login(&email, &password)
        }
        "logout" => run_logout(),
        "whoami" => run_whoami(),
        "new" => {
            if args.len() < 5 {
                bail!("Usage: new <name> <description> <target-audience>");
            }
            run_new(&args[2], &args[3], &args[4])
        }
        "list" => run_list(),
        "show" => {
            let id = args.get(2).context("Usage: show <session-id> [--json]")?;
            let json_output = args.iter().any(|a| a == "--json");
            run_show(id, json_output).await
        }
        "market" => {
            let id = args.get(2).context("Usage: market <session-id>")?;
            run_market(id).await
        }
        "evidence" => {
            if args.len() < 4 {
                bail!("Usage: evidence <session-id> <what you learned...>");
            }
            let text = args[3..].join(" ");
            run_evidence(&args[2], &text).await
        }
        "toggle" => {
            let id = args.get(2).context("Usage: toggle <action-id> [done|todo]")?;
            let done = args.get(3).map(|s| s.as_str()) != Some("todo");
            run_toggle(id, done)
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Ok(())
        }
    }
}

fn print_usage() {
    println!("founderboard - simulated board of advisors\n");
    println!("Account:");
    println!("  signup <email> <password>      Create an account and sign in");
    println!("  login <email> <password>       Sign in");
    println!("  logout                         Sign out");
    println!("  whoami                         Show the signed-in account\n");
    println!("Sessions:");
    println!("  new <name> <desc> <audience>   Start validating an idea");
    println!("  list                           List your sessions");
    println!("  show <session-id> [--json]     Board review (runs it if needed)");
    println!("  market <session-id>            Simulate market personas");
    println!("  evidence <session-id> <text>   Submit evidence for re-scoring");
    println!("  toggle <action-id> [done|todo] Check off a next action");
}

fn credentials_from(args: &[String]) -> Result<(String, String)> {
    match (args.get(2), args.get(3)) {
        (Some(email), Some(password)) => Ok((email.clone(), password.clone())),
        _ => bail!("Usage: {} <email> <password>", args[1]),
    }
}

fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("FOUNDERBOARD_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("founderboard"))
}

fn open_gateways() -> Result<(SessionEngine, SqliteIdentity, PathBuf)> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join("founderboard.db");

    let store = SqliteStore::open(&db_path)?;
    let identity = SqliteIdentity::open(&db_path)?;
    let engine = SessionEngine::new(Arc::new(store)).with_generator(ContentGenerator::new());
    tracing::info!("Database initialized at {:?}", db_path);

    Ok((engine, identity, data_dir))
}

fn token_path(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("session.token")
}

fn require_user(identity: &SqliteIdentity, data_dir: &std::path::Path) -> Result<User> {
    let path = token_path(data_dir);
    let token = std::fs::read_to_string(&path)
        .map(|t| t.trim().to_string())
        .unwrap_or_default();
    if token.is_empty() {
        bail!("Not signed in. Run: signup <email> <password>");
    }
    identity
        .current_user(&token)?
        .context("Session expired. Run: login <email> <password>")
}

fn run_signup(email: &str, password: &str) -> Result<()> {
    let (_, identity, data_dir) = open_gateways()?;
    let (user, token) = identity.sign_up(email, password)?;
    std::fs::write(token_path(&data_dir), &token)?;
    println!("✅ Account created and signed in as {}", user.email);
    Ok(())
}

fn run_login(email: &str, password: &str) -> Result<()> {
    let (_, identity, data_dir) = open_gateways()?;
    let (user, token) = identity.sign_in(email, password)?;
    std::fs::write(token_path(&data_dir), &token)?;
    println!("✅ Signed in as {}", user.email);
    Ok(())
}

fn run_logout() -> Result<()> {
    let (_, identity, data_dir) = open_gateways()?;
    let path = token_path(&data_dir);
    if let Ok(token) = std::fs::read_to_string(&path) {
        identity.sign_out(token.trim())?;
        std::fs::remove_file(&path).ok();
    }
    println!("👋 Signed out");
    Ok(())
}

fn run_whoami() -> Result<()> {
    let (_, identity, data_dir) = open_gateways()?;
    let user = require_user(&identity, &data_dir)?;
    println!("{} (since {})", user.email, user.created_at.format("%Y-%m-%d"));
    Ok(())
}

fn run_new(name: &str, description: &str, audience: &str) -> Result<()> {
    let (engine, identity, data_dir) = open_gateways()?;
    let user = require_user(&identity, &data_dir)?;

    let idea = IdeaProfile {
        name: name.to_string(),
        description: description.to_string(),
        target_audience: audience.to_string(),
    };
    let session = engine.create_session(&user.id, &idea)?;

    println!("💡 Session created: {}", session.id);
    println!("   Next: show {} to convene the board", session.id);
    Ok(())
}

fn run_list() -> Result<()> {
    let (engine, identity, data_dir) = open_gateways()?;
    let user = require_user(&identity, &data_dir)?;

    let sessions = engine.sessions(&user.id)?;
    if sessions.is_empty() {
        println!("No sessions yet. Start one with: new <name> <desc> <audience>");
        return Ok(());
    }

    println!("📋 Your validation sessions:\n");
    for s in sessions {
        let score = if s.board_score > 0.0 {
            format!("{:.1}/10", s.board_score)
        } else {
            "—".to_string()
        };
        println!("  {}  [{}]  {}  {}", s.id, s.stage.as_str(), score, s.idea.name);
    }
    Ok(())
}

async fn run_show(session_id: &str, json_output: bool) -> Result<()> {
    let (engine, identity, data_dir) = open_gateways()?;
    let user = require_user(&identity, &data_dir)?;

    let view = engine.ensure_pattern_check(&user.id, session_id).await?;
    if json_output {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view);
    }
    Ok(())
}

async fn run_market(session_id: &str) -> Result<()> {
    let (engine, identity, data_dir) = open_gateways()?;
    let user = require_user(&identity, &data_dir)?;

    let view = engine.run_market_sim(&user.id, session_id).await?;
    print_view(&view);
    Ok(())
}

async fn run_evidence(session_id: &str, evidence: &str) -> Result<()> {
    let (engine, identity, data_dir) = open_gateways()?;
    let user = require_user(&identity, &data_dir)?;

    let view = engine.submit_evidence(&user.id, session_id, evidence).await?;
    print_view(&view);
    Ok(())
}

fn run_toggle(action_id: &str, done: bool) -> Result<()> {
    let (engine, identity, data_dir) = open_gateways()?;
    let user = require_user(&identity, &data_dir)?;

    engine.toggle_action(&user.id, action_id, done)?;
    println!("{} Action updated", if done { "☑" } else { "☐" });
    Ok(())
}

fn advisor_icon(advisor: AdvisorType) -> &'static str {
    match advisor {
        AdvisorType::Operator => "🔧",
        AdvisorType::Growth => "📈",
        AdvisorType::Finance => "💰",
        AdvisorType::Product => "🎯",
        AdvisorType::Skeptic => "🤨",
    }
}

fn score_bar(score: f64) -> String {
    let filled = score.round().clamp(0.0, 10.0) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

fn print_view(view: &SessionView) {
    let s = &view.session;
    println!("\n💡 {} [{}]", s.idea.name, s.stage.as_str());
    println!("   {}", s.idea.description);
    println!("   Audience: {}", s.idea.target_audience);

    if s.board_score > 0.0 {
        println!("\n   Board score: [{}] {:.1}/10", score_bar(s.board_score), s.board_score);
        println!("   Verdict: {}", s.last_verdict);
    }

    if view.has_pattern_check() {
        println!("\n🧠 BOARD FEEDBACK:");
        for entry in view.current_feedback() {
            println!(
                "\n   {} {} [{}] {:.1}",
                advisor_icon(entry.advisor_type),
                entry.advisor_type.as_str(),
                score_bar(entry.score),
                entry.score
            );
            println!("      {}", entry.diagnosis);
            println!("      ⚡ {}", entry.prescription);
        }
    }

    if view.has_market_sim() {
        println!("\n🗣 MARKET PERSONAS:");
        for p in &view.personas {
            println!("\n   {} ({}% likely to buy)", p.persona_name, p.willingness_to_buy);
            println!("      {}", p.persona_description);
            println!("      \"{}\"", p.reaction_quote);
        }
    }

    if !view.actions.is_empty() {
        println!("\n📌 NEXT ACTIONS:");
        for a in &view.actions {
            let mark = if a.is_completed { "☑" } else { "☐" };
            println!("   {} {}  ({})", mark, a.action_text, a.id);
        }
    }

    match s.stage {
        Stage::PatternCheck => println!("\n   Next: market {} to simulate the market", s.id),
        Stage::MarketSim => println!("\n   Next: evidence {} <what you learned>", s.id),
        _ => {}
    }
    println!();
}
