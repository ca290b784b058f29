use crate::activity::{self, ActivityBucket};
use crate::audit::AuditLog;
use crate::config::Config;
use crate::filter::PersonFilter;
use crate::fixtures::Dataset;
use crate::records::{Person, Status, Ticket, Withdrawal};
use crate::stats::{
    format_amount, format_count, format_duration, format_percent, percentage, CallSummary,
    PersonSummary, TicketSummary, WithdrawalSummary,
};
use crate::view::{Action, Dialog, Outcome, Section, ViewState};
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::cell::RefCell;
use std::fmt::Write as _;
use std::path::PathBuf;

pub struct Context {
    pub root: PathBuf,
    pub session_id: String,
    pub config: Config,
    pub data: Dataset,
    pub data_source: String,
    pub view: RefCell<ViewState>,
    pub audit: Option<RefCell<AuditLog>>,
    pub verbose: bool,
}

/// Run `;`-separated commands and print their output
pub fn run_once(ctx: &Context, commands: &str) -> Result<()> {
    for line in commands.split(';').map(str::trim).filter(|l| !l.is_empty()) {
        match execute(ctx, line)? {
            Some(output) => print!("{}", output),
            None => break,
        }
    }
    Ok(())
}

pub fn run_repl(ctx: Context) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!(
        "backoffice ({} people from {}) - type /help for commands, /exit to quit",
        ctx.data.people.len(),
        ctx.data_source
    );

    loop {
        let prompt = format!("{}> ", ctx.view.borrow().section().as_str());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                match execute(&ctx, line) {
                    Ok(Some(output)) => print!("{}", output),
                    Ok(None) => break,
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Execute one console command. Returns the text to print, or None to exit.
pub fn execute(ctx: &Context, line: &str) -> Result<Option<String>> {
    let words = shell_words::split(line)?;
    let Some((cmd, args)) = words.split_first() else {
        return Ok(Some(String::new()));
    };

    if ctx.verbose {
        eprintln!("[cmd] {}", line);
    }
    if let Some(audit) = &ctx.audit {
        audit.borrow_mut().command(line)?;
    }

    let now = Utc::now();
    let output = match cmd.as_str() {
        "/exit" | "/quit" => return Ok(None),
        "/help" => HELP.to_string(),
        "/section" => match args.first() {
            Some(name) => {
                let section = Section::from_str(name).ok_or_else(|| {
                    anyhow!(
                        "Unknown section: {}. Available: {}",
                        name,
                        Section::ALL.map(|s| s.as_str()).join(", ")
                    )
                })?;
                dispatch(ctx, Action::Navigate(section))?;
                format!("Section: {}\n", section.as_str())
            }
            None => format!("Section: {}\n", ctx.view.borrow().section().as_str()),
        },
        "/list" => render_section(ctx, now),
        "/search" => {
            dispatch(
                ctx,
                Action::SetFilter {
                    facet: "search".to_string(),
                    value: args.join(" "),
                },
            )?;
            render_section(ctx, now)
        }
        "/filter" => {
            if args.is_empty() {
                return Ok(Some(render_state(ctx)));
            }
            let pairs = args
                .iter()
                .map(|assignment| {
                    assignment
                        .split_once('=')
                        .map(|(facet, value)| (facet.to_string(), value.to_string()))
                        .ok_or_else(|| anyhow!("Expected facet=value, got '{}'", assignment))
                })
                .collect::<Result<Vec<_>>>()?;
            dispatch(ctx, Action::SetFilters(pairs))?;
            render_section(ctx, now)
        }
        "/clear" => {
            dispatch(ctx, Action::ClearFilters)?;
            "Filters cleared\n".to_string()
        }
        "/views" => render_views(ctx),
        "/view" => {
            let name = args
                .first()
                .ok_or_else(|| anyhow!("Usage: /view <name>"))?;
            let preset = ctx
                .config
                .views
                .get(name.as_str())
                .ok_or_else(|| anyhow!("Unknown view: {}. Use /views to list.", name))?;
            dispatch(ctx, Action::UsePreset(preset.to_filter()?))?;
            render_section(ctx, now)
        }
        "/stats" => render_stats(ctx, now),
        "/active" => {
            dispatch(ctx, Action::Open(Dialog::ActiveUsers))?;
            render_dialog(ctx, now)
        }
        "/open" => open_with_id(ctx, args, Dialog::Profile, now)?,
        "/edit" => open_with_id(ctx, args, Dialog::EditPerson, now)?,
        "/delete" => open_with_id(ctx, args, Dialog::ConfirmDelete, now)?,
        "/review" => open_with_id(ctx, args, Dialog::ReviewWithdrawal, now)?,
        "/ticket" => open_with_id(ctx, args, Dialog::TicketDetail, now)?,
        "/confirm" => {
            let action = match ctx.view.borrow().dialog() {
                Some(Dialog::EditPerson(_)) => Action::SaveEdit,
                _ => Action::ConfirmDelete,
            };
            dispatch(ctx, action)?
        }
        "/save" => dispatch(ctx, Action::SaveEdit)?,
        "/approve" => dispatch(ctx, Action::ApproveWithdrawal)?,
        "/reject" => dispatch(ctx, Action::RejectWithdrawal)?,
        "/resolve" => dispatch(ctx, Action::ResolveTicket)?,
        "/close" => {
            dispatch(ctx, Action::Close)?;
            "Dialog closed\n".to_string()
        }
        "/withdrawals" => navigate_and_list(ctx, Section::Wallet, now)?,
        "/tickets" => navigate_and_list(ctx, Section::Support, now)?,
        "/calls" => navigate_and_list(ctx, Section::Calls, now)?,
        "/state" => render_state(ctx),
        "/classify" => {
            if args.is_empty() {
                return Err(anyhow!("Usage: /classify <phrase>, e.g. /classify 3 hours ago"));
            }
            render_classification(&args.join(" "))
        }
        other => return Err(anyhow!("Unknown command: {}. Type /help.", other)),
    };

    Ok(Some(output))
}

const HELP: &str = "\
Commands:
  /exit                     - quit
  /help                     - show commands
  /section [name]           - show or switch section
  /list                     - list the current section
  /stats                    - stat cards for the current section
  /state                    - show section, dialog and filters
Filtering:
  /search <text>            - search name, email, phone
  /filter facet=value ...   - type, status, tier, last_active (now|24h|7d|30d|inactive)
  /clear                    - reset filters for this section
  /views                    - list saved views
  /view <name>              - apply a saved view
People:
  /active                   - show who is active now
  /classify <phrase>        - classify a phrase such as \"3 hours ago\"
  /open <id>                - view a profile
  /edit <id>, /save         - edit a person
  /delete <id>, /confirm    - delete a person
Wallet and support:
  /withdrawals              - list withdrawals
  /review <id>              - review a withdrawal, then /approve or /reject
  /tickets                  - list support tickets
  /ticket <id>, /resolve    - view and resolve a ticket
  /calls                    - list tip calls
  /close                    - close the open dialog
";

/// Apply an action, record any audit event, and describe what happened
fn dispatch(ctx: &Context, action: Action) -> Result<String> {
    let before = ctx.view.borrow().clone();
    let outcome = ctx.view.borrow_mut().apply(action, &ctx.data)?;
    match outcome {
        Outcome::Updated => Ok(String::new()),
        Outcome::Audit(event) => {
            if let Some(audit) = &ctx.audit {
                // An action without an audit line did not happen; reopen its dialog
                if let Err(e) = audit.borrow_mut().record(&event) {
                    ctx.view.replace(before);
                    return Err(e.context(format!("Could not record: {}", event.describe())));
                }
            }
            Ok(format!("Done: {}\n", event.describe()))
        }
    }
}

fn open_with_id(
    ctx: &Context,
    args: &[String],
    dialog: fn(u32) -> Dialog,
    now: DateTime<Utc>,
) -> Result<String> {
    let id = args
        .first()
        .ok_or_else(|| anyhow!("Missing id"))?
        .trim_start_matches('#')
        .parse::<u32>()
        .map_err(|_| anyhow!("Invalid id: {}", args[0]))?;
    dispatch(ctx, Action::Open(dialog(id)))?;
    Ok(render_dialog(ctx, now))
}

fn navigate_and_list(ctx: &Context, section: Section, now: DateTime<Utc>) -> Result<String> {
    dispatch(ctx, Action::Navigate(section))?;
    Ok(render_section(ctx, now))
}

// ============================================================================
// Rendering
// ============================================================================

fn money(ctx: &Context, value: f64) -> String {
    format_amount(value, &ctx.config.display.currency)
}

/// People listed by the current section, after filtering
fn visible_people<'a>(ctx: &'a Context, view: &ViewState, now: DateTime<Utc>) -> Vec<&'a Person> {
    let Some(kind) = view.section().people() else {
        return Vec::new();
    };
    let default_filter = PersonFilter::new();
    let filter = view.person_filter().unwrap_or(&default_filter);
    let source = match kind {
        Some(kind) => ctx.data.people_of(kind),
        None => ctx.data.people.iter().collect(),
    };
    filter.apply(source, now)
}

fn render_section(ctx: &Context, now: DateTime<Utc>) -> String {
    let view = ctx.view.borrow();
    match view.section() {
        Section::Wallet => {
            render_withdrawals(ctx, &view.withdrawal_filter().apply(&ctx.data.withdrawals))
        }
        Section::Support => render_tickets(ctx, &view.ticket_filter().apply(&ctx.data.tickets)),
        Section::Calls => render_calls(ctx),
        Section::Settings => render_settings(ctx),
        Section::Games => render_games(ctx, &visible_people(ctx, &view, now)),
        _ => render_people(ctx, &visible_people(ctx, &view, now), now),
    }
}

fn render_people(ctx: &Context, people: &[&Person], now: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<5} {:<20} {:<34} {:<10} {:<12} Last active",
        "ID", "Name", "Email", "Status", "Tier"
    );
    for p in people.iter().take(ctx.config.display.page_size) {
        let activity = p.activity(now);
        let marker = if activity.is_active_now { "* " } else { "" };
        let _ = writeln!(
            out,
            "{:<5} {:<20} {:<34} {:<10} {:<12} {}{}",
            p.id,
            p.name,
            p.email,
            p.status.as_str(),
            p.tier.as_str(),
            marker,
            activity.label
        );
    }
    let _ = writeln!(
        out,
        "{} of {} shown",
        people.len().min(ctx.config.display.page_size),
        people.len()
    );
    out
}

fn render_games(ctx: &Context, people: &[&Person]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<5} {:<20} {:>7} {:>6} {:>9} {:>14}",
        "ID", "Name", "Played", "Wins", "Win rate", "Losses"
    );
    for p in people
        .iter()
        .filter(|p| p.games_played > 0)
        .take(ctx.config.display.page_size)
    {
        let _ = writeln!(
            out,
            "{:<5} {:<20} {:>7} {:>6} {:>9} {:>14}",
            p.id,
            p.name,
            p.games_played,
            p.wins,
            format_percent(percentage(p.wins as f64, p.games_played as f64)),
            money(ctx, p.total_losses)
        );
    }
    out
}

fn render_withdrawals(ctx: &Context, items: &[&Withdrawal]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<5} {:<20} {:>14} {:<14} {:<10} Requested",
        "ID", "Person", "Amount", "Method", "Status"
    );
    for w in items.iter().take(ctx.config.display.page_size) {
        let _ = writeln!(
            out,
            "{:<5} {:<20} {:>14} {:<14} {:<10} {}",
            w.id,
            ctx.data.name_of(w.person_id),
            money(ctx, w.amount),
            w.method,
            w.status.as_str(),
            w.requested
        );
    }
    out
}

fn render_tickets(ctx: &Context, items: &[&Ticket]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<5} {:<20} {:<8} {:<12} Subject",
        "ID", "Person", "Priority", "Status"
    );
    for t in items.iter().take(ctx.config.display.page_size) {
        let _ = writeln!(
            out,
            "{:<5} {:<20} {:<8} {:<12} {}",
            t.id,
            ctx.data.name_of(t.person_id),
            t.priority.as_str(),
            t.status.as_str(),
            t.subject
        );
    }
    out
}

fn render_calls(ctx: &Context) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<5} {:<20} {:<20} {:>9} {:>12}",
        "ID", "Caller", "Creator", "Duration", "Tip"
    );
    for c in ctx.data.calls.iter().take(ctx.config.display.page_size) {
        let _ = writeln!(
            out,
            "{:<5} {:<20} {:<20} {:>9} {:>12}",
            c.id,
            ctx.data.name_of(c.caller_id),
            ctx.data.name_of(c.creator_id),
            format_duration(u64::from(c.duration_secs)),
            money(ctx, c.tip_amount)
        );
    }
    out
}

fn render_settings(ctx: &Context) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Currency:   {}", ctx.config.display.currency);
    let _ = writeln!(out, "Page size:  {}", ctx.config.display.page_size);
    let _ = writeln!(out, "Data:       {}", ctx.data_source);
    match &ctx.audit {
        Some(audit) => {
            let _ = writeln!(out, "Audit log:  {}", audit.borrow().path.display());
        }
        None => {
            let _ = writeln!(out, "Audit log:  disabled");
        }
    }
    let _ = writeln!(out, "Session:    {}", ctx.session_id);
    let _ = writeln!(out, "Root:       {}", ctx.root.display());
    for source in &ctx.config.sources {
        let _ = writeln!(out, "Config:     {}", source.display());
    }
    out.push_str(&render_views(ctx));
    out
}

fn render_views(ctx: &Context) -> String {
    if ctx.config.views.is_empty() {
        return "No saved views\n".to_string();
    }
    let mut out = String::from("Saved views:\n");
    for (name, preset) in &ctx.config.views {
        match preset.to_filter() {
            Ok(filter) => {
                let _ = writeln!(out, "  {}: {}", name, filter);
            }
            Err(e) => {
                let _ = writeln!(out, "  {}: invalid ({})", name, e);
            }
        }
    }
    out
}

fn render_stats(ctx: &Context, now: DateTime<Utc>) -> String {
    let view = ctx.view.borrow();
    let mut out = String::new();
    match view.section() {
        Section::Wallet => {
            let s = WithdrawalSummary::from_withdrawals(&ctx.data.withdrawals);
            let _ = writeln!(out, "Pending requests:  {}", format_count(s.pending_count as u64));
            let _ = writeln!(out, "Pending amount:    {}", money(ctx, s.pending_amount));
            let _ = writeln!(out, "Approved amount:   {}", money(ctx, s.approved_amount));
            let _ = writeln!(out, "Rejected requests: {}", format_count(s.rejected_count as u64));
        }
        Section::Support => {
            let s = TicketSummary::from_tickets(&ctx.data.tickets);
            let _ = writeln!(out, "Tickets: {} ({} open)", s.total, s.open);
            let _ = writeln!(out, "High: {}  Medium: {}  Low: {}", s.high, s.medium, s.low);
        }
        Section::Calls => {
            let s = CallSummary::from_calls(&ctx.data.calls);
            let _ = writeln!(out, "Calls:        {}", format_count(s.calls as u64));
            let _ = writeln!(out, "Minutes:      {}", format_count(s.total_minutes()));
            let _ = writeln!(out, "Total tips:   {}", money(ctx, s.total_tips));
            let _ = writeln!(out, "Average tip:  {}", money(ctx, s.average_tip()));
        }
        Section::Settings => out.push_str("No stats for settings\n"),
        section => {
            let people = visible_people(ctx, &view, now);
            let s = PersonSummary::from_people(people.iter().copied(), now);
            let _ = writeln!(out, "Total:          {}", format_count(s.count as u64));
            let _ = writeln!(out, "Active status:  {}", format_count(s.active as u64));
            let _ = writeln!(out, "Active now:     {}", format_count(s.active_now as u64));
            let _ = writeln!(
                out,
                "Premium:        {} ({})",
                format_count(s.premium as u64),
                format_percent(s.premium_share())
            );
            let _ = writeln!(out, "Wallet total:   {}", money(ctx, s.wallet_balance));
            let _ = writeln!(out, "Wallet average: {}", money(ctx, s.average_wallet()));
            let _ = writeln!(out, "Earnings:       {}", money(ctx, s.total_earnings));
            if section == Section::Games || s.games_played > 0 {
                let _ = writeln!(out, "Games played:   {}", format_count(s.games_played));
                let _ = writeln!(out, "Win rate:       {}", format_percent(s.win_rate()));
                let _ = writeln!(out, "Loss rate:      {}", format_percent(s.loss_rate()));
                let _ = writeln!(out, "Losses:         {}", money(ctx, s.total_losses));
            }
            if s.unrecognized_activity > 0 {
                let _ = writeln!(
                    out,
                    "Unparsed last-active values: {}",
                    s.unrecognized_activity
                );
            }
            if section == Section::Dashboard {
                let w = WithdrawalSummary::from_withdrawals(&ctx.data.withdrawals);
                let t = TicketSummary::from_tickets(&ctx.data.tickets);
                let _ = writeln!(
                    out,
                    "Pending withdrawals: {} ({})",
                    w.pending_count,
                    money(ctx, w.pending_amount)
                );
                let _ = writeln!(out, "Open tickets:   {}", t.open);
            }
        }
    }
    out
}

fn render_classification(phrase: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Phrase:      {}", phrase);
    let active = if activity::is_active_now(phrase) { "yes" } else { "no" };
    let _ = writeln!(out, "Active now:  {}", active);
    let _ = writeln!(out, "Label:       {}", activity::online_since_label(phrase));
    let _ = writeln!(out, "Bucket:      {}", activity::activity_bucket(phrase).as_str());
    out
}

fn render_dialog(ctx: &Context, now: DateTime<Utc>) -> String {
    let Some(dialog) = ctx.view.borrow().dialog() else {
        return "No dialog open\n".to_string();
    };
    let mut out = String::new();
    match dialog {
        Dialog::ActiveUsers => {
            let active: Vec<&Person> = ctx
                .data
                .people
                .iter()
                .filter(|p| p.status == Status::Active)
                .filter(|p| p.activity(now).is_active_now)
                .collect();
            let _ = writeln!(out, "Active now ({}):", active.len());
            for p in active {
                let _ = writeln!(out, "  {:<5} {:<20} {}", p.id, p.name, p.activity(now).label);
            }
        }
        Dialog::Profile(id) | Dialog::EditPerson(id) | Dialog::ConfirmDelete(id) => {
            if let Some(p) = ctx.data.person(id) {
                out.push_str(&render_profile(ctx, p, now));
            }
            match dialog {
                Dialog::EditPerson(_) => out.push_str("Editing. /save to save, /close to cancel\n"),
                Dialog::ConfirmDelete(_) => {
                    out.push_str("Delete this person? /confirm or /close\n")
                }
                _ => {}
            }
        }
        Dialog::ReviewWithdrawal(id) => {
            if let Some(w) = ctx.data.withdrawal(id) {
                let _ = writeln!(
                    out,
                    "Withdrawal #{}: {} via {} for {} ({}, requested {})",
                    w.id,
                    money(ctx, w.amount),
                    w.method,
                    ctx.data.name_of(w.person_id),
                    w.status.as_str(),
                    w.requested
                );
                out.push_str("/approve, /reject or /close\n");
            }
        }
        Dialog::TicketDetail(id) => {
            if let Some(t) = ctx.data.ticket(id) {
                let _ = writeln!(out, "Ticket #{}: {}", t.id, t.subject);
                let _ = writeln!(
                    out,
                    "From {} | {} priority | {}",
                    ctx.data.name_of(t.person_id),
                    t.priority.as_str(),
                    t.status.as_str()
                );
                out.push_str("/resolve or /close\n");
            }
        }
    }
    out
}

fn render_profile(ctx: &Context, p: &Person, now: DateTime<Utc>) -> String {
    let activity = p.activity(now);
    let mut out = String::new();
    let _ = writeln!(out, "#{} {} ({})", p.id, p.name, p.kind.as_str());
    let _ = writeln!(out, "  Email:     {}", p.email);
    let _ = writeln!(out, "  Phone:     {}", p.phone);
    if !p.location.is_empty() {
        let _ = writeln!(out, "  Location:  {}", p.location);
    }
    let _ = writeln!(out, "  Status:    {} / {}", p.status.as_str(), p.tier.as_str());
    let _ = writeln!(out, "  Activity:  {} [{}]", activity.label, activity.bucket.as_str());
    if activity.bucket == ActivityBucket::Unrecognized {
        let _ = writeln!(out, "  (last-active value could not be parsed)");
    }
    let _ = writeln!(out, "  Wallet:    {}", money(ctx, p.wallet_balance));
    let _ = writeln!(out, "  Earnings:  {}", money(ctx, p.total_earnings));
    if p.games_played > 0 {
        let _ = writeln!(
            out,
            "  Games:     {} played, {} won ({})",
            p.games_played,
            p.wins,
            format_percent(percentage(p.wins as f64, p.games_played as f64))
        );
    }
    out
}

fn render_state(ctx: &Context) -> String {
    let view = ctx.view.borrow();
    let mut out = String::new();
    let _ = writeln!(out, "Section: {}", view.section().as_str());
    let _ = writeln!(
        out,
        "Dialog:  {}",
        view.dialog()
            .map(|d| d.describe())
            .unwrap_or_else(|| "none".to_string())
    );
    match view.section() {
        Section::Wallet => {
            let _ = writeln!(out, "Filter:  {:?}", view.withdrawal_filter());
        }
        Section::Support => {
            let _ = writeln!(out, "Filter:  {:?}", view.ticket_filter());
        }
        _ => {
            if let Some(filter) = view.person_filter() {
                if filter.is_unconstrained() {
                    let _ = writeln!(out, "Filter:  none");
                } else {
                    let _ = writeln!(out, "Filter:  {}", filter);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewPreset;

    fn context(audit_dir: Option<&std::path::Path>) -> Context {
        let mut config = Config::default();
        config.views.insert(
            "premium".to_string(),
            ViewPreset {
                tier: Some("premium".to_string()),
                ..Default::default()
            },
        );
        Context {
            root: PathBuf::from("."),
            session_id: "test".to_string(),
            config,
            data: Dataset::builtin(),
            data_source: "builtin".to_string(),
            view: RefCell::new(ViewState::new()),
            audit: audit_dir.map(|dir| RefCell::new(AuditLog::in_dir(dir, "test").unwrap())),
            verbose: false,
        }
    }

    fn run(ctx: &Context, line: &str) -> String {
        execute(ctx, line).unwrap().unwrap()
    }

    #[test]
    fn test_exit() {
        let ctx = context(None);
        assert!(execute(&ctx, "/exit").unwrap().is_none());
    }

    #[test]
    fn test_filter_users() {
        let ctx = context(None);
        run(&ctx, "/section users");
        let out = run(&ctx, "/filter status=active");
        assert!(out.contains("Sarah Wilson"));
        assert!(!out.contains("Mike Johnson"));
        assert!(out.contains("3 of 3 shown"));

        let out = run(&ctx, "/search sarah");
        assert!(out.contains("Online since 25m"));
        assert!(out.contains("1 of 1 shown"));
    }

    #[test]
    fn test_quoted_search() {
        let ctx = context(None);
        let out = run(&ctx, "/search \"john doe\"");
        assert!(out.contains("John Doe"));
        assert!(out.contains("1 of 1 shown"));
    }

    #[test]
    fn test_saved_view() {
        let ctx = context(None);
        run(&ctx, "/section sellers");
        let out = run(&ctx, "/view premium");
        assert!(out.contains("Kofi Mensah"));
        assert!(!out.contains("Elena Rossi"));
        assert!(execute(&ctx, "/view nope").is_err());
    }

    #[test]
    fn test_unknown_command_and_bad_facet() {
        let ctx = context(None);
        assert!(execute(&ctx, "/frobnicate").is_err());
        assert!(execute(&ctx, "/filter status=sleeping").is_err());
        assert!(execute(&ctx, "/filter status").is_err());
        assert!(execute(&ctx, "/open abc").is_err());
    }

    #[test]
    fn test_stats_for_users() {
        let ctx = context(None);
        run(&ctx, "/section users");
        let out = run(&ctx, "/stats");
        assert!(out.contains("Total:          5"));
        assert!(out.contains("Win rate:       52.6%"));
        assert!(out.contains("$2,430.75"));
    }

    #[test]
    fn test_delete_flow_is_audited() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(Some(dir.path()));

        let out = run(&ctx, "/delete 4");
        assert!(out.contains("Emily Davis"));
        assert!(out.contains("/confirm"));
        let out = run(&ctx, "/confirm");
        assert_eq!(out, "Done: deleted person #4\n");
        assert!(ctx.view.borrow().dialog().is_none());

        let path = ctx.audit.as_ref().unwrap().borrow().path.clone();
        let log = std::fs::read_to_string(path).unwrap();
        assert!(log.contains("\"type\":\"person_deleted\""));
        assert!(log.contains("\"type\":\"command\""));
    }

    #[test]
    fn test_withdrawal_review_flow() {
        let ctx = context(None);
        let out = run(&ctx, "/withdrawals");
        assert!(out.contains("Amara Okafor"));
        assert!(out.contains("$2,500.00"));

        run(&ctx, "/review 1");
        assert_eq!(run(&ctx, "/approve"), "Done: approved withdrawal #1\n");
        assert!(execute(&ctx, "/approve").is_err());
    }

    #[test]
    fn test_active_dialog() {
        let ctx = context(None);
        let out = run(&ctx, "/active");
        assert!(out.contains("Sarah Wilson"));
        assert!(out.contains("Amara Okafor"));
        assert!(!out.contains("Mike Johnson"));
        assert_eq!(ctx.view.borrow().dialog(), Some(Dialog::ActiveUsers));
    }

    #[test]
    fn test_failed_filter_leaves_state_unchanged() {
        let ctx = context(None);
        run(&ctx, "/section users");
        let err = execute(&ctx, "/filter status=active tier=bogus").unwrap_err();
        assert!(err.to_string().contains("Unknown tier value: 'bogus'"));
        assert!(ctx.view.borrow().person_filter().unwrap().is_unconstrained());
        assert!(run(&ctx, "/state").contains("Filter:  none"));

        assert!(execute(&ctx, "/filter status=active tier").is_err());
        assert!(ctx.view.borrow().person_filter().unwrap().is_unconstrained());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_failed_audit_write_keeps_dialog_open() {
        let mut ctx = context(None);
        // Every write to /dev/full fails with ENOSPC
        let log = AuditLog::new(std::path::Path::new("/dev/full"), "test").unwrap();
        ctx.audit = Some(RefCell::new(log));
        ctx.view
            .borrow_mut()
            .apply(Action::Open(Dialog::ConfirmDelete(4)), &ctx.data)
            .unwrap();

        let err = dispatch(&ctx, Action::ConfirmDelete).unwrap_err();
        assert!(err.to_string().contains("deleted person #4"));
        assert_eq!(ctx.view.borrow().dialog(), Some(Dialog::ConfirmDelete(4)));
    }

    #[test]
    fn test_classify_phrase() {
        let ctx = context(None);
        let out = run(&ctx, "/classify 1 hour ago");
        assert!(out.contains("Active now:  yes"));
        assert!(out.contains("Label:       Online since 1h"));
        assert!(out.contains("Bucket:      now"));

        let out = run(&ctx, "/classify \"a while back\"");
        assert!(out.contains("Active now:  no"));
        assert!(out.contains("Bucket:      unrecognized"));
        assert!(execute(&ctx, "/classify").is_err());
    }

    #[test]
    fn test_run_once_sequence() {
        let ctx = context(None);
        run_once(&ctx, "/section creators; /filter last_active=now").unwrap();
        let view = ctx.view.borrow();
        assert_eq!(view.section(), Section::Creators);
        assert!(!view.person_filter().unwrap().last_active.is_all());
    }
}
