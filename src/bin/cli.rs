use batch_scheduler::{
    Batch, BatchRegister, BatchUpdate, CalendarError, DurationsInput, Holiday, PhaseDurations,
    PhaseWindowCalculator, WeeklyOffDays, WorkCalendar, load_calendar_config, load_holidays_from_csv,
    load_register_from_csv, load_register_from_json, save_calendar_config, save_register_to_csv,
    save_register_to_json,
};
use chrono::{Local, NaiveDate};
use polars::prelude::{AnyValue, DataFrame};
use std::io::{self, Write};

fn cell_text(av: &AnyValue) -> String {
    match av {
        AnyValue::Null => String::new(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        _ => av.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
            .collect();
        rows.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.len());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: &[String]| {
        let mut line = String::from("|");
        for (ci, cell) in cells.iter().enumerate() {
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.len())));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(col_names.as_slice()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &rows {
        out.push_str(&render_row(row.as_slice()));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn print_table(result: polars::prelude::PolarsResult<DataFrame>) {
    match result {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error rendering table: {}", e),
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               List batches\n  today [YYYY-MM-DD]                 Show or pin the evaluation date\n  add <id> <start> <i> <t> <c> <o> <oc> <name...>\n                                     Create a batch (durations in working days)\n  start <id> <YYYY-MM-DD>            Change a batch start date\n  durations <id> <i> <t> <c> <o> <oc>\n                                     Change a batch's phase durations\n  rename <id> <name...>              Rename a batch\n  delete <id>                        Delete a batch\n  plan <id>                          Show a batch's phase windows\n  preview <start> <i> <t> <c> <o> <oc>\n                                     Compute phase windows without saving\n  status [YYYY-MM-DD]                Re-resolve statuses (default: today)\n  calendar show                      Display the organization calendar\n  calendar off <days_csv>            Set weekly off days (e.g. Saturday,Sunday)\n  calendar holidays <on|off>         Consider holidays or not\n  calendar holiday add <YYYY-MM-DD> [recurring] <name...>\n                                     Add a holiday\n  calendar holiday remove <YYYY-MM-DD>\n                                     Remove holidays on a date\n  calendar import <csv_path>         Add holidays from a date,name,is_recurring CSV\n  calendar set <json_path>           Load calendar config from JSON file\n  calendar save <json_path>          Save calendar config to JSON file\n  save <json|csv> <path>             Persist batches to disk\n  load <json|csv> <path>             Load batches from disk\n  quit|exit                          Exit"
    );
}

fn print_calendar_info(register: &BatchRegister) {
    let config = register.calendar_config();
    let holidays = config
        .holidays
        .iter()
        .map(|h| {
            if h.is_recurring {
                format!("{} {} (yearly)", h.date, h.name)
            } else {
                format!("{} {}", h.date, h.name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    println!("Weekly off days    : {}", config.weekly_off_days.join(", "));
    println!("Consider holidays  : {}", config.consider_holidays);
    println!("Holidays           : {}", holidays);
}

fn print_program_days(calendar: &WorkCalendar, batch: &Batch) {
    let first = batch.dates.induction_start;
    let last = batch.dates.ojt_certification_end;
    println!(
        "Working days {} -> {}: {}",
        first,
        last,
        calendar.count_working_days(first, last)
    );
    let holidays = calendar
        .holidays_in_range(first, last)
        .into_iter()
        .map(|(date, h)| format!("{} {}", date, h.name))
        .collect::<Vec<_>>();
    if !holidays.is_empty() {
        println!("Holidays skipped   : {}", holidays.join(", "));
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| "Invalid date (YYYY-MM-DD)".to_string())
}

fn parse_id(s: &str) -> Result<u32, String> {
    s.parse::<u32>().map_err(|_| "Invalid id".to_string())
}

fn parse_durations(values: &[&str]) -> Result<PhaseDurations, String> {
    if values.len() != 5 {
        return Err("Expected five durations: induction training certification ojt ojt_certification".into());
    }
    let mut parsed = [0i64; 5];
    for (slot, raw) in parsed.iter_mut().zip(values) {
        *slot = raw
            .parse::<i64>()
            .map_err(|_| format!("Invalid duration '{raw}'"))?;
    }
    DurationsInput::new(parsed[0], parsed[1], parsed[2], parsed[3], parsed[4])
        .validate()
        .map_err(|e| e.to_string())
}

fn edit_calendar<F>(register: &mut BatchRegister, today: NaiveDate, edit: F) -> bool
where
    F: FnOnce(&mut WorkCalendar) -> Result<(), CalendarError>,
{
    match register.update_calendar(today, edit) {
        Ok(()) => {
            println!("Calendar updated, {} batches replanned.", register.len());
            print_calendar_info(register);
            true
        }
        Err(e) => {
            println!("Calendar error: {}", e);
            false
        }
    }
}

fn handle_calendar<'a, I>(register: &mut BatchRegister, today: NaiveDate, mut parts: I)
where
    I: Iterator<Item = &'a str>,
{
    match parts.next() {
        Some("show") | None => print_calendar_info(register),
        Some("off") => match parts.next() {
            Some(csv) => {
                let names: Vec<&str> = csv.split(',').filter(|s| !s.trim().is_empty()).collect();
                edit_calendar(register, today, |calendar| {
                    calendar.set_weekly_off_days(WeeklyOffDays::from_names(names)?)
                });
            }
            None => println!("Usage: calendar off <days_csv>"),
        },
        Some("holidays") => {
            let consider = match parts.next() {
                Some("on") => true,
                Some("off") => false,
                _ => {
                    println!("Usage: calendar holidays <on|off>");
                    return;
                }
            };
            edit_calendar(register, today, |calendar| {
                calendar.set_consider_holidays(consider)
            });
        }
        Some("holiday") => match (parts.next(), parts.next()) {
            (Some("add"), Some(date_s)) => {
                let date = match parse_date(date_s) {
                    Ok(d) => d,
                    Err(e) => {
                        println!("{}", e);
                        return;
                    }
                };
                let mut rest: Vec<&str> = parts.collect();
                let recurring = rest.first() == Some(&"recurring");
                if recurring {
                    rest.remove(0);
                }
                let name = rest.join(" ");
                let holiday = if recurring {
                    Holiday::recurring(date, name)
                } else {
                    Holiday::new(date, name)
                };
                edit_calendar(register, today, |calendar| calendar.add_holiday(holiday));
            }
            (Some("remove"), Some(date_s)) => {
                let date = match parse_date(date_s) {
                    Ok(d) => d,
                    Err(e) => {
                        println!("{}", e);
                        return;
                    }
                };
                if !register.calendar().holidays().iter().any(|h| h.date == date) {
                    println!("No holiday on {}.", date);
                    return;
                }
                edit_calendar(register, today, |calendar| {
                    calendar.remove_holidays_on(date);
                    Ok(())
                });
            }
            _ => println!("Usage: calendar holiday add <YYYY-MM-DD> [recurring] <name...> | remove <YYYY-MM-DD>"),
        },
        Some("import") => match parts.next() {
            Some(path) => match load_holidays_from_csv(path) {
                Ok(holidays) => {
                    let count = holidays.len();
                    let imported = edit_calendar(register, today, |calendar| {
                        for holiday in holidays {
                            calendar.add_holiday(holiday)?;
                        }
                        Ok(())
                    });
                    if imported {
                        println!("Imported {} holidays from {}.", count, path);
                    }
                }
                Err(e) => println!("Error importing holidays: {}", e),
            },
            None => println!("Usage: calendar import <csv_path>"),
        },
        Some("set") => match parts.next() {
            Some(path) => match load_calendar_config(path) {
                Ok(config) => match WorkCalendar::from_config(&config) {
                    Ok(calendar) => match register.set_calendar(calendar, today) {
                        Ok(()) => {
                            println!("Calendar updated from {}.", path);
                            print_calendar_info(register);
                        }
                        Err(e) => println!("Error applying calendar: {}", e),
                    },
                    Err(e) => println!("Error applying calendar: {}", e),
                },
                Err(e) => println!("Error loading calendar: {}", e),
            },
            None => println!("Usage: calendar set <json_path>"),
        },
        Some("save") => match parts.next() {
            Some(path) => match save_calendar_config(&register.calendar_config(), path) {
                Ok(_) => println!("Calendar saved to {}.", path),
                Err(e) => println!("Error saving calendar: {}", e),
            },
            None => println!("Usage: calendar save <json_path>"),
        },
        Some(other) => {
            println!("Unknown calendar command '{}'.", other);
            println!("Usage: calendar show|off|holidays|holiday|import|set|save ...");
        }
    }
}

fn main() {
    env_logger::init();

    let mut register = BatchRegister::default();
    let mut today = Local::now().date_naive();

    println!("Batch Scheduler (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_table(register.dataframe()),
            "today" => match parts.next() {
                Some(date_s) => match parse_date(date_s) {
                    Ok(date) => {
                        today = date;
                        let summary = register.refresh(today);
                        println!("Today set to {} ({}).", today, summary.to_cli_summary());
                    }
                    Err(e) => println!("{}", e),
                },
                None => println!("Today is {}.", today),
            },
            "add" => {
                let args: Vec<&str> = parts.collect();
                if args.len() < 8 {
                    println!("Usage: add <id> <start> <i> <t> <c> <o> <oc> <name...>");
                    continue;
                }
                let parsed = parse_id(args[0]).and_then(|id| {
                    let start = parse_date(args[1])?;
                    let durations = parse_durations(&args[2..7])?;
                    Ok((id, start, durations))
                });
                let (id, start, durations) = match parsed {
                    Ok(v) => v,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                let name = args[7..].join(" ");
                let added = register.create_batch(id, name, start, durations, today).map(|batch| {
                    format!(
                        "Added batch {} ({} -> {}, {}).",
                        batch.id, batch.dates.induction_start, batch.dates.end_date, batch.status
                    )
                });
                match added {
                    Ok(message) => {
                        println!("{}", message);
                        print_table(register.dataframe());
                    }
                    Err(e) => println!("Error adding batch: {}", e),
                }
            }
            "start" | "durations" | "rename" => {
                let args: Vec<&str> = parts.collect();
                let Some(id_s) = args.first() else {
                    println!("Usage: {} <id> ...", cmd);
                    continue;
                };
                let id = match parse_id(id_s) {
                    Ok(v) => v,
                    Err(e) => {
                        println!("{}", e);
                        continue;
                    }
                };
                let update = match cmd {
                    "start" => match args.get(1).map(|s| parse_date(s)) {
                        Some(Ok(date)) => Ok(BatchUpdate {
                            start_date: Some(date),
                            ..BatchUpdate::default()
                        }),
                        Some(Err(e)) => Err(e),
                        None => Err("Usage: start <id> <YYYY-MM-DD>".to_string()),
                    },
                    "durations" => parse_durations(&args[1..]).map(|durations| BatchUpdate {
                        durations: Some(durations),
                        ..BatchUpdate::default()
                    }),
                    _ if args.len() > 1 => Ok(BatchUpdate {
                        name: Some(args[1..].join(" ")),
                        ..BatchUpdate::default()
                    }),
                    _ => Err("Usage: rename <id> <name...>".to_string()),
                };
                match update {
                    Ok(update) => match register.update_batch(id, update, today) {
                        Ok(batch) => {
                            println!(
                                "Updated batch {} ({} -> {}, {}).",
                                batch.id, batch.dates.induction_start, batch.dates.end_date, batch.status
                            );
                        }
                        Err(e) => println!("Error updating batch: {}", e),
                    },
                    Err(e) => println!("{}", e),
                }
            }
            "delete" => match parts.next().map(parse_id) {
                Some(Ok(id)) => {
                    if register.delete_batch(id) {
                        println!("Deleted batch {id}.");
                        print_table(register.dataframe());
                    } else {
                        println!("Batch {id} not found.");
                    }
                }
                Some(Err(e)) => println!("{}", e),
                None => println!("Usage: delete <id>"),
            },
            "plan" => match parts.next().map(parse_id) {
                Some(Ok(id)) => match register.find_batch(id) {
                    Some(batch) => {
                        println!("Batch {} '{}' is {} on {}.", batch.id, batch.name, batch.status_on(today), today);
                        print_table(batch.schedule().to_dataframe());
                        print_program_days(register.calendar(), batch);
                    }
                    None => println!("Batch {id} not found."),
                },
                Some(Err(e)) => println!("{}", e),
                None => println!("Usage: plan <id>"),
            },
            "preview" => {
                let args: Vec<&str> = parts.collect();
                if args.len() != 6 {
                    println!("Usage: preview <start> <i> <t> <c> <o> <oc>");
                    continue;
                }
                let parsed = parse_date(args[0]).and_then(|start| Ok((start, parse_durations(&args[1..])?)));
                match parsed {
                    Ok((start, durations)) => {
                        match PhaseWindowCalculator::new(register.calendar()).execute(start, &durations) {
                            Ok(schedule) => {
                                println!("Handover to ops on {} (status on {}: {}).", schedule.handover_to_ops(), today, schedule.status_on(today));
                                print_table(schedule.to_dataframe());
                            }
                            Err(e) => println!("Error computing schedule: {}", e),
                        }
                    }
                    Err(e) => println!("{}", e),
                }
            }
            "status" => {
                let on = match parts.next().map(parse_date) {
                    Some(Ok(date)) => date,
                    Some(Err(e)) => {
                        println!("{}", e);
                        continue;
                    }
                    None => today,
                };
                let summary = register.refresh(on);
                println!("Statuses on {}: {}.", on, summary.to_cli_summary());
                print_table(register.dataframe());
            }
            "calendar" => handle_calendar(&mut register, today, parts),
            "save" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match save_register_to_json(&register, path) {
                        Ok(_) => println!("Batches saved to {}.", path),
                        Err(e) => println!("Error saving batches: {}", e),
                    },
                    (Some("csv"), Some(path)) => match save_register_to_csv(&register, path) {
                        Ok(_) => println!("Batches saved to {}.", path),
                        Err(e) => println!("Error saving batches: {}", e),
                    },
                    _ => println!("Usage: save <json|csv> <path>"),
                }
            }
            "load" => {
                let fmt = parts.next();
                let path = parts.next();
                let loaded = match (fmt, path) {
                    (Some("json"), Some(path)) => load_register_from_json(path),
                    (Some("csv"), Some(path)) => load_register_from_csv(path),
                    _ => {
                        println!("Usage: load <json|csv> <path>");
                        continue;
                    }
                };
                match loaded {
                    Ok(mut loaded) => {
                        let summary = loaded.refresh(today);
                        register = loaded;
                        println!("Batches loaded from {} ({}).", path.unwrap_or_default(), summary.to_cli_summary());
                        print_table(register.dataframe());
                    }
                    Err(e) => println!("Error loading batches: {}", e),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
