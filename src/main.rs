use anyhow::Result;
use clap::Parser;
use log::warn;

use youcoder::app::App;
use youcoder::cli::Args;
use youcoder::config::{self, AppSettings};
use youcoder::entities::ActionRecord;
use youcoder::export;
use youcoder::paths::PathConfig;

fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = args.log_file.clone().map(|opt| {
        opt.unwrap_or_else(|| std::path::PathBuf::from("youcoder.log"))
    });
    config::init_logging(args.verbosity, log_file);

    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());
    let settings = AppSettings::load(&path_config);
    let mut app = App::new(path_config, settings)?;

    run(&mut app, &args)?;

    app.shutdown();
    Ok(())
}

fn run(app: &mut App, args: &Args) -> Result<()> {
    let mut did_something = false;

    for name in &args.add_teams {
        app.registry.add(name);
        did_something = true;
    }
    for name in &args.remove_teams {
        app.registry.remove(name);
        did_something = true;
    }

    if args.teams {
        for team in app.registry.teams() {
            println!("{}", team);
        }
        did_something = true;
    }

    if let Some(video_id) = &args.video_id {
        app.session.activate_video(video_id);
        let actions = app.session.actions();

        if args.list {
            print_timeline(video_id, &actions);
            did_something = true;
        }

        if let Some(export) = &args.export {
            let path = export
                .clone()
                .unwrap_or_else(|| app.settings.default_export_file.clone().into());
            export::write_csv(&actions, &path)?;
            println!("Exported {} record(s) to {}", actions.len(), path.display());
            did_something = true;
        }

        if !args.list && args.export.is_none() {
            print_timeline(video_id, &actions);
            did_something = true;
        }
    } else if args.list || args.export.is_some() {
        warn!("--list/--export need a VIDEO_ID");
    }

    // Bare invocation: show what the store holds
    if !did_something {
        let mut videos = app.primary.keys().unwrap_or_default();
        videos.retain(|k| k != "teams");
        println!("Stored timelines: {}", videos.len());
        for video_id in videos {
            let count = app.chain.load_timeline_for_video(&video_id).len();
            println!("  {} ({} record(s))", video_id, count);
        }
        println!("Teams: {}", app.registry.teams().join(", "));
    }

    Ok(())
}

fn print_timeline(video_id: &str, actions: &[ActionRecord]) {
    println!("{}: {} record(s)", video_id, actions.len());
    for rec in actions {
        let end = rec
            .end
            .map(|ms| format!("{}ms", ms))
            .unwrap_or_else(|| "open".to_string());
        let labels = if rec.labels.is_empty() {
            String::new()
        } else {
            format!("  [{}]", rec.labels.join(", "))
        };
        println!("  {} / {}  {}ms..{}{}", rec.team, rec.action, rec.start, end, labels);
    }
}
