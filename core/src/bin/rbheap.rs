use std::io::{self, Read};
use std::process;

use clap::{
    arg_enum, crate_authors, crate_description, crate_version, value_t, App, AppSettings, Arg,
    ArgMatches,
};
use failure::{Error, ResultExt};
use human_panic::setup_panic;
use log::debug;

use rbheap::datastruct::{DynComparator, OrderedMap, PriorityQueue};

arg_enum! {
    #[allow(non_camel_case_types)]
    #[derive(Debug)]
    pub enum Mode {
        dot,
        sort,
        top,
    }
}

fn parse_values<'a, I>(items: I) -> Result<Vec<i64>, Error>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut values = Vec::new();
    for item in items {
        let value = item
            .parse::<i64>()
            .with_context(|_| format!("invalid value '{}'", item))?;
        values.push(value);
    }
    Ok(values)
}

fn queue(values: Vec<i64>, min: bool) -> PriorityQueue<i64, DynComparator<i64>> {
    let comparator: DynComparator<i64> = if min {
        Box::new(|a: &i64, b: &i64| b.cmp(a))
    } else {
        Box::new(|a: &i64, b: &i64| a.cmp(b))
    };
    PriorityQueue::from_vec_with_comparator(values, comparator)
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let values = match matches.values_of("VALUES") {
        Some(args) => parse_values(args)?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            parse_values(buf.split_whitespace())?
        }
    };
    debug!("read {} values", values.len());

    let min = matches.is_present("min");
    match value_t!(matches.value_of("MODE"), Mode)? {
        Mode::dot => {
            let mut map = OrderedMap::new();
            for (rank, value) in values.into_iter().enumerate() {
                map.put(value, rank);
            }
            print!("{}", map.dump_as_dot());
        }
        Mode::sort => {
            for value in queue(values, min).into_sorted_vec() {
                println!("{}", value);
            }
        }
        Mode::top => {
            let count = value_t!(matches.value_of("COUNT"), usize)?;
            let mut queue = queue(values, min);
            for _ in 0..count {
                match queue.pop() {
                    Some(value) => println!("{}", value),
                    None => break,
                }
            }
        }
    }
    Ok(())
}

fn app() -> App<'static, 'static> {
    App::new("rbheap")
        .about(crate_description!())
        .version(crate_version!())
        .author(crate_authors!())
        .setting(AppSettings::AllowNegativeNumbers)
        .arg(
            Arg::with_name("MODE")
                .short("m")
                .long("mode")
                .possible_values(&Mode::variants())
                .default_value("sort")
                .help("Mode to use"),
        )
        .arg(
            Arg::with_name("min")
                .long("min")
                .help("Gives the smallest values the highest priority"),
        )
        .arg(
            Arg::with_name("COUNT")
                .short("n")
                .long("count")
                .takes_value(true)
                .default_value("1")
                .help("Number of values printed in top mode"),
        )
        .arg(
            Arg::with_name("VALUES")
                .multiple(true)
                .help("Integers to process, read from stdin when omitted"),
        )
}

fn main() {
    setup_panic!();
    env_logger::init();

    let matches = app().get_matches();

    if let Err(e) = run(&matches) {
        eprintln!("error: {}", e);
        for cause in e.iter_causes() {
            eprintln!("  caused by: {}", cause);
        }
        process::exit(1);
    }
}
