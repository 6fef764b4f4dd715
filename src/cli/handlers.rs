use std::env;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use tokio::sync::Mutex;

use super::format::{format_progress, format_record, format_taken_at, status_label};
use crate::config::TrackerConfig;
use crate::entity::{MedicationFields, MedicationRecord};
use crate::error::{Result, TrackerError};
use crate::reminder::{ConsoleNotifier, Notifier, Permission, ReminderEvaluator, ReminderScheduler};
use crate::storage::{FileStore, MedicationStore, TRACKER_DIR};

/// Find the project root by looking for .medtracker/
fn find_project_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(TRACKER_DIR).is_dir() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}

fn open_store() -> Result<(MedicationStore<FileStore>, TrackerConfig)> {
    let root = find_project_root();
    let backend = FileStore::open(&root)?;
    let config = TrackerConfig::load(backend.dir())?;
    let store = MedicationStore::load_with_key(backend, config.storage_key.clone())?;
    Ok((store, config))
}

fn position_of(store: &MedicationStore<FileStore>, record: &MedicationRecord) -> usize {
    store
        .list()
        .iter()
        .position(|r| r.id == record.id)
        .map_or(0, |i| i + 1)
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

pub fn handle_init() -> Result<()> {
    let root = env::current_dir()?;

    let store = FileStore::init(&root)?;
    TrackerConfig::default().save(store.dir())?;

    println!("Initialized medtracker project in {}", root.display());
    Ok(())
}

pub fn handle_add(
    name: String,
    dosage: String,
    time: String,
    frequency: String,
    json: bool,
) -> Result<()> {
    let (mut store, _) = open_store()?;

    let record = store.add(&MedicationFields::new(name, dosage, time, frequency))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!(
            "Added medication {} ({}) - {} {} at {}",
            position_of(&store, &record),
            record.short_id(),
            record.name,
            record.dosage,
            record.time.to_12_hour()
        );
    }

    Ok(())
}

pub fn handle_list(json: bool) -> Result<()> {
    let (store, _) = open_store()?;
    let now = Local::now();

    if json {
        println!("{}", serde_json::to_string_pretty(store.list())?);
    } else if store.is_empty() {
        println!("No medications added yet. Run 'medtracker add' to get started.");
    } else {
        println!("Medications:\n");
        for (i, record) in store.list().iter().enumerate() {
            println!("{}", format_record(i + 1, record, &now));
        }
        println!("\n{}", format_progress(&store.progress(&now)));
    }

    Ok(())
}

pub fn handle_get(reference: String, json: bool) -> Result<()> {
    let (store, _) = open_store()?;
    let id = store.resolve(&reference)?;
    let record = store
        .get(&id)
        .ok_or_else(|| TrackerError::NotFound(reference.clone()))?;
    let now = Local::now();

    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        println!("{}", record.name);
        println!("  id:        {}", record.id);
        println!("  dosage:    {}", record.dosage);
        println!("  time:      {} ({})", record.time, record.time.to_12_hour());
        println!("  frequency: {}", record.frequency);
        println!("  status:    {}", status_label(record, &now));
        if let Some(taken_at) = &record.taken_at {
            println!("  last taken: {}", format_taken_at(taken_at, &now));
        }
        println!(
            "  created:   {}",
            record.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

pub fn handle_update(
    reference: String,
    name: Option<String>,
    dosage: Option<String>,
    time: Option<String>,
    frequency: Option<String>,
    json: bool,
) -> Result<()> {
    let (mut store, _) = open_store()?;
    let id = store.resolve(&reference)?;
    let current = store
        .get(&id)
        .ok_or_else(|| TrackerError::NotFound(reference.clone()))?;

    let mut fields = current.fields();
    if let Some(name) = name {
        fields.name = name;
    }
    if let Some(dosage) = dosage {
        fields.dosage = dosage;
    }
    if let Some(time) = time {
        fields.time = time;
    }
    if let Some(frequency) = frequency {
        fields.frequency = frequency;
    }

    let record = store.update(&id, &fields)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!(
            "Updated medication {} ({}) - {} {} at {}",
            position_of(&store, &record),
            record.short_id(),
            record.name,
            record.dosage,
            record.time.to_12_hour()
        );
    }

    Ok(())
}

pub fn handle_delete(reference: String, force: bool) -> Result<()> {
    let (mut store, _) = open_store()?;
    let id = store.resolve(&reference)?;
    let record = store
        .get(&id)
        .cloned()
        .ok_or_else(|| TrackerError::NotFound(reference.clone()))?;

    // Confirm deletion unless --force is used
    if !force {
        eprintln!(
            "Delete medication {} ({}) - {}? [y/N] ",
            position_of(&store, &record),
            record.short_id(),
            record.name
        );

        if atty::is(atty::Stream::Stdin) {
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        } else {
            return Err(TrackerError::Validation(
                "Use --force to delete in non-interactive mode".to_string(),
            ));
        }
    }

    store.remove(&id)?;
    println!("Deleted medication ({}) - {}", record.short_id(), record.name);

    Ok(())
}

pub fn handle_toggle(reference: String, json: bool) -> Result<()> {
    let (mut store, _) = open_store()?;
    let id = store.resolve(&reference)?;
    let now = Local::now();

    let record = store.toggle_taken(&id, &now)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else if record.is_taken_today(&now) {
        println!("✅ {} marked as taken!", record.name);
    } else {
        println!("{} marked as not taken", record.name);
    }

    Ok(())
}

pub fn handle_progress(json: bool) -> Result<()> {
    let (store, _) = open_store()?;
    let progress = store.progress(&Local::now());

    if json {
        println!("{}", serde_json::to_string_pretty(&progress)?);
    } else {
        println!("{}", format_progress(&progress));
        if progress.streak == 1 {
            println!("All medications taken today.");
        }
    }

    Ok(())
}

pub fn handle_remind(json: bool) -> Result<()> {
    let (store, config) = open_store()?;
    let notifier = ConsoleNotifier::new(config.notifications);
    let evaluator = ReminderEvaluator::new(config.dismiss_after());
    let now = Local::now();

    let events = runtime()?.block_on(async {
        notifier.request_permission().await;
        evaluator.tick(store.list(), &notifier, &now).await
    });

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
    } else if notifier.permission() != Permission::Granted {
        println!("Notifications are disabled in {}/config.yaml.", TRACKER_DIR);
    } else if events.is_empty() {
        println!("No reminders due at {}.", now.format("%H:%M"));
    }

    Ok(())
}

pub fn handle_watch() -> Result<()> {
    let (store, config) = open_store()?;
    let notifier = Arc::new(ConsoleNotifier::new(config.notifications));
    let scheduler = ReminderScheduler::from_config(&config);
    let count = store.len();
    let store = Arc::new(Mutex::new(store));

    runtime()?.block_on(async move {
        let handle = scheduler.start(store, notifier).await;
        println!(
            "Watching {} medication(s), checking every {}s. Press Ctrl-C to stop.",
            count, config.reminder_interval_secs
        );

        let result = tokio::signal::ctrl_c().await;
        handle.stop().await;
        result.map_err(TrackerError::from)
    })
}
