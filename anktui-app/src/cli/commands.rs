use crate::cli::opts::*;
use crate::config::Config;

use anktui_core::{
    build_session, filter_by_text, retention_stats, session_limit, Card, Clock, Deck, DeckStore,
    Rating, RetentionStats, StudyMode,
};
use anyhow::{anyhow, bail, Context, Result};
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub struct CliContext {
    pub store: Arc<dyn DeckStore>,
    pub clock: Arc<dyn Clock>,
    pub config: Config,
}

pub async fn run_cli(cmd: Command, ctx: &CliContext) -> Result<()> {
    match cmd {
        Command::Deck(cmd) => deck_cmd(ctx, cmd).await,
        Command::Card(cmd) => card_cmd(ctx, cmd).await,
        Command::Study(cmd) => {
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut out = std::io::stdout();
            study_cmd(ctx, cmd, &mut input, &mut out).await
        }
        Command::Stats(cmd) => stats_cmd(ctx, cmd).await,
        Command::Config(_) | Command::Tui => bail!("not a store command"),
    }
}

async fn deck_cmd(ctx: &CliContext, cmd: DeckCmd) -> Result<()> {
    let now = ctx.clock.now();
    match cmd {
        DeckCmd::Add { name, description } => {
            let name = name.trim();
            if name.is_empty() {
                bail!("deck name must not be empty");
            }
            let decks = ctx.store.load_all_decks().await?;
            if decks.iter().any(|d| d.name.eq_ignore_ascii_case(name)) {
                bail!("a deck named '{name}' already exists");
            }
            let deck = Deck::new(name, description, now);
            ctx.store.save_deck(&deck).await?;
            info!(deck = %deck.id, "created deck");
            println!("{}", deck.id);
        }
        DeckCmd::List => {
            for d in ctx.store.load_all_decks().await? {
                let counts = d.card_counts(now);
                println!(
                    "{}\t{}\ttotal={}\tnew={}\tdue={}\t{}",
                    d.id, d.name, counts.total, counts.new, counts.due, d.description
                );
            }
        }
        DeckCmd::Rm { deck } => {
            let d = resolve_deck(&*ctx.store, &deck).await?;
            ctx.store.delete_deck(d.id).await?;
            println!("ok");
        }
        DeckCmd::Edit { deck, name, description } => {
            let mut d = resolve_deck(&*ctx.store, &deck).await?;
            let name = name.unwrap_or_else(|| d.name.clone());
            if name.trim().is_empty() {
                bail!("deck name must not be empty");
            }
            let description = description.unwrap_or_else(|| d.description.clone());
            d.update_info(name.trim(), description, now);
            ctx.store.save_deck(&d).await?;
            println!("ok");
        }
    }
    Ok(())
}

async fn card_cmd(ctx: &CliContext, cmd: CardCmd) -> Result<()> {
    let now = ctx.clock.now();
    match cmd {
        CardCmd::Add(a) => {
            let (front, back) = (a.front.trim(), a.back.trim());
            if front.is_empty() || back.is_empty() {
                bail!("both --front and --back are required");
            }
            let mut deck = resolve_deck(&*ctx.store, &a.deck).await?;
            let card = Card::new(front, back, now).with_ease_factor(ctx.config.default_ease_factor);
            let id = card.id;
            deck.add_card(card, now)?;
            ctx.store.save_deck(&deck).await?;
            println!("{id}");
        }
        CardCmd::List { deck, query } => {
            let decks = match deck {
                Some(sel) => vec![resolve_deck(&*ctx.store, &sel).await?],
                None => ctx.store.load_all_decks().await?,
            };
            for d in decks {
                let cards = filter_by_text(&d.cards, query.as_deref().unwrap_or(""));
                for c in cards {
                    println!(
                        "{}\t{}\t{}\tdeck={}\tinterval={}\treps={}\tease={:.2}\tnext={}",
                        c.id,
                        c.front,
                        c.back,
                        d.name,
                        c.interval,
                        c.repetition,
                        c.ease_factor,
                        c.next_review.format("%Y-%m-%d %H:%M")
                    );
                }
            }
        }
        CardCmd::Rm { deck, card_id } => {
            let mut d = resolve_deck(&*ctx.store, &deck).await?;
            let id = parse_uuid(&card_id)?;
            if !d.remove_card(id, now) {
                bail!("card not found: {card_id}");
            }
            ctx.store.save_deck(&d).await?;
            println!("ok");
        }
        CardCmd::Edit(e) => {
            let mut d = resolve_deck(&*ctx.store, &e.deck).await?;
            let id = parse_uuid(&e.card_id)?;
            let card = d.card(id).ok_or_else(|| anyhow!("card not found: {}", e.card_id))?;
            let front = e.front.unwrap_or_else(|| card.front.clone());
            let back = e.back.unwrap_or_else(|| card.back.clone());
            if front.trim().is_empty() || back.trim().is_empty() {
                bail!("card sides must not be empty");
            }
            d.update_card_content(id, front.trim(), back.trim(), now)?;
            ctx.store.save_deck(&d).await?;
            println!("ok");
        }
    }
    Ok(())
}

pub async fn study_cmd<R: BufRead, W: Write>(
    ctx: &CliContext,
    cmd: StudyCmd,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let mut deck = resolve_deck(&*ctx.store, &cmd.deck).await?;
    let limit = match cmd.max {
        Some(m) => session_limit(m)?,
        None => ctx.config.session_size()?,
    };
    let mode = if cmd.practice { StudyMode::Practice } else { StudyMode::Review };
    let mut session = build_session(&deck, limit, mode, ctx.clock.now());

    if session.is_empty() {
        writeln!(out, "no cards to study in {}", deck.name)?;
        return Ok(());
    }

    while let Some(card) = session.current_card().cloned() {
        let (pos, total) = session.progress();
        writeln!(out, "\n[{pos}/{total}] {}", session.deck_name)?;
        writeln!(out, "Q: {}", card.front)?;
        if is_quit(&prompt(input, out, "[enter=show, q=quit] ")?) {
            break;
        }
        session.reveal();
        writeln!(out, "A: {}", card.back)?;
        writeln!(out, "[1=Again, 2=Hard, 3=Good, 4=Easy, q=quit]")?;

        let rating = loop {
            let line = prompt(input, out, "rating> ")?;
            if is_quit(&line) {
                break None;
            }
            match line.parse::<Rating>() {
                Ok(r) => break Some(r),
                Err(_) => writeln!(out, "enter 1-4 or q")?,
            }
        };
        let Some(rating) = rating else { break };

        let updated = session.rate_current(&mut deck, rating, ctx.clock.now())?;
        if let Err(e) = ctx.store.save_deck(&deck).await {
            warn!(deck = %deck.id, error = %e, "saving after rating failed");
            writeln!(out, "! could not save progress: {e}")?;
        }
        writeln!(out, "→ next due in {} day(s)", updated.interval)?;
        session.advance()?;
    }

    writeln!(out, "\nstudied {} card(s) from {}", session.completed(), deck.name)?;
    Ok(())
}

async fn stats_cmd(ctx: &CliContext, cmd: StatsCmd) -> Result<()> {
    let decks = match cmd.deck {
        Some(sel) => vec![resolve_deck(&*ctx.store, &sel).await?],
        None => ctx.store.load_all_decks().await?,
    };
    let mut all = RetentionStats::default();
    for d in &decks {
        let s = retention_stats(&d.cards);
        print_stats(&d.name, &s);
        all.merge(&s);
    }
    if decks.len() > 1 {
        print_stats("all decks", &all);
    }
    Ok(())
}

fn print_stats(label: &str, s: &RetentionStats) {
    println!(
        "{label}\ttotal={}\tnew={}\tyoung={}\tmature={}\tmature%={:.0}",
        s.total,
        s.new,
        s.young,
        s.mature,
        s.mature_ratio() * 100.0
    );
}

pub fn config_cmd(cmd: ConfigCmd, config: &Config, path: &Path) -> Result<()> {
    match cmd {
        ConfigCmd::Path => println!("{}", path.display()),
        ConfigCmd::Show => println!("{}", serde_json::to_string_pretty(config)?),
        ConfigCmd::Init { force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            Config::default().save(path)?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

// ===== Helpers =====
fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|_| anyhow!("invalid card id: {s}"))
}

pub async fn resolve_deck<S: DeckStore + ?Sized>(store: &S, sel: &str) -> Result<Deck> {
    if let Ok(id) = Uuid::parse_str(sel) {
        if let Ok(d) = store.load_deck(id).await {
            return Ok(d);
        }
    }
    let decks = store.load_all_decks().await?;
    decks
        .into_iter()
        .find(|d| d.name.eq_ignore_ascii_case(sel.trim()))
        .with_context(|| format!("deck not found: {sel}"))
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<String> {
    write!(out, "{label}")?;
    out.flush().ok();
    let mut s = String::new();
    if input.read_line(&mut s)? == 0 {
        return Ok("q".to_string());
    }
    Ok(s.trim().to_string())
}

fn is_quit(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "q" | "quit")
}
