//! Converter of classic Avara levels into XML maps
//!
//! ```text
//! avara_conv levels.rsrc arena.xml "The Arena"
//! avara_conv --list levels.rsrc
//! avara_conv --raw arena.pict arena.xml "The Arena"
//! ```

use anyhow::Context;
use avara_lvl::{
    emit, pict,
    rsrc::{Resource, ResourceFork, ResourceType},
};
use avara_utils::{ok, AnyResult, AnyhowResultExt};
use clap::{ArgAction, Parser};
use itertools::Itertools;
use log::*;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::PathBuf,
};

pub mod settings;
use settings::ConvertSettings;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Resource file to read the level from
    pub input: PathBuf,
    /// Where to write the map
    #[arg(required_unless_present = "list")]
    pub output: Option<PathBuf>,
    /// Name of the map. Also picks the level resource, if one is named like that.
    #[arg(required_unless_present = "list")]
    pub name: Option<String>,

    /// Id of the level resource, instead of looking it up by name
    #[arg(long, value_name = "ID", allow_negative_numbers = true)]
    pub resource: Option<i16>,
    /// Read the input as a bare picture instead of a resource file
    #[arg(long, conflicts_with = "resource")]
    pub raw: bool,
    /// TOML file with conversion settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// List the resources of the input and exit
    #[arg(long, conflicts_with = "raw")]
    pub list: bool,

    /// Log more, can be repeated
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    /// Log less, can be repeated
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        match (self.verbose, self.quiet) {
            (0, 0) => LevelFilter::Info,
            (1, _) => LevelFilter::Debug,
            (_, 0) => LevelFilter::Trace,
            (_, 1) => LevelFilter::Warn,
            (_, 2) => LevelFilter::Error,
            _ => LevelFilter::Off,
        }
    }
}

/// Runs `avara_conv` as if it was ran from the command line.
pub fn run(cli: Cli) -> AnyResult {
    let settings = match &cli.config {
        Some(path) => ConvertSettings::load(path)?,
        None => ConvertSettings::default(),
    };
    let tag = settings.resource_type()?;

    let data = fs::read(&cli.input)
        .with_context(|| format!("couldn't read {}", cli.input.display()))?;

    if cli.list {
        let fork = ResourceFork::read(&data).context("couldn't read the resource fork")?;
        print!("{}", list_resources(&fork));
        return ok();
    }

    let output = cli.output.otherwise("no output path given")?;
    let name = cli.name.otherwise("no map name given")?;

    let fork;
    let picture = if cli.raw {
        pict::strip_file_preamble(&data)
    } else {
        fork = ResourceFork::read(&data).context("couldn't read the resource fork")?;
        let resource = select_resource(&fork, tag, cli.resource, &name)?;
        info!(
            "Converting {tag} resource {} {}",
            resource.id,
            resource.name.as_deref().unwrap_or("(unnamed)")
        );
        &resource.data[..]
    };

    let conversion = avara_lvl::convert_picture(picture, &settings.options(&name))
        .context("couldn't decode the level picture")?;
    if !conversion.diagnostics.is_empty() {
        warn!(
            "{} script problems, the affected entities were skipped",
            conversion.diagnostics.len()
        );
    }

    // Only touch the output once everything else succeeded
    let mut file = BufWriter::new(
        File::create(&output)
            .with_context(|| format!("couldn't create {}", output.display()))?,
    );
    emit::write_map(&mut file, &conversion.map)?;
    file.flush()?;

    info!("Wrote {}", output.display());
    ok()
}

/// Picks the level to convert: the one with the given id, or else the one named like the map,
/// or else the one with the lowest id.
pub fn select_resource<'f>(
    fork: &'f ResourceFork,
    tag: ResourceType,
    id: Option<i16>,
    name: &str,
) -> AnyResult<&'f Resource> {
    if let Some(id) = id {
        return fork
            .get(tag, id)
            .otherwise(format!("there's no {tag} resource with id {id}"));
    }

    if let Some(resource) = fork.find_named(tag, name) {
        return Ok(resource);
    }

    let first = fork
        .resources(tag)
        .next()
        .otherwise(format!("the file has no {tag} resources"))?;
    debug!("No {tag} resource is named `{name}`, using the first one");
    Ok(first)
}

/// One line per resource: type, id, size and name.
pub fn list_resources(fork: &ResourceFork) -> String {
    fork.types()
        .flat_map(move |tag| fork.resources(tag).map(move |resource| (tag, resource)))
        .map(|(tag, resource)| {
            format!(
                "{tag} {:>6} {:>8} bytes  {}\n",
                resource.id,
                resource.data.len(),
                resource.name.as_deref().unwrap_or("")
            )
        })
        .join("")
}
