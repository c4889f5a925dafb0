use super::CliError;
use super::helpers::*;
use anyhow::Context;
use nuflux_core::common::config::RateConfig;
use nuflux_core::common::constants::PI;
use nuflux_core::common::species::{Channel, NeutrinoSpecies};
use nuflux_core::common::units::Energy;
use nuflux_core::domain::{Bounds, NufluxError};
use nuflux_core::modules::cross_section::Medium;
use nuflux_core::modules::earth::{attenuation_parameter, penetration_length};
use nuflux_core::modules::flux::{AstroFluxParams, FluxKind};
use nuflux_core::modules::{
    ChannelSelection, EventRateIntegrator, EventRateQuery, Neutrino, SegmentRate,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(clap::Args, Debug, Default)]
pub(super) struct ConfigArgs {
    /// JSON run configuration; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory with nu_cc.dat, nu_nc.dat, nubar_cc.dat and nubar_nc.dat (σ in mb)
    #[arg(long)]
    cross_section_dir: Option<PathBuf>,

    /// Root of the persisted atmospheric flux grids
    #[arg(long)]
    flux_cache_dir: Option<PathBuf>,

    /// Astrophysical spectral index
    #[arg(long)]
    gamma: Option<f64>,

    /// Astrophysical ν + ν̄ normalization
    #[arg(long)]
    phi_astro: Option<f64>,
}

impl ConfigArgs {
    fn load(&self, resolution: Option<usize>) -> Result<RateConfig, CliError> {
        load_config(&ConfigOverrides {
            config: self.config.clone(),
            cross_section_dir: self.cross_section_dir.clone(),
            flux_cache_dir: self.flux_cache_dir.clone(),
            gamma: self.gamma,
            phi_astro: self.phi_astro,
            resolution,
        })
    }
}

#[derive(clap::Args, Debug)]
pub(super) struct FluxSelectionArgs {
    /// Flux hypothesis: astro, atmo or total
    #[arg(long, default_value = "total")]
    flux: String,

    /// Atmospheric parent category: total, pi, k, pr or conv
    #[arg(long, default_value = "total")]
    source: String,

    /// Month name, comma-separated months, or "average"
    #[arg(long, default_value = "average")]
    month: String,
}

impl FluxSelectionArgs {
    fn kind(&self, astro: AstroFluxParams) -> Result<FluxKind, CliError> {
        flux_kind(&self.flux, &self.source, &self.month, astro)
    }
}

#[derive(clap::Args, Debug)]
pub(super) struct RateArgs {
    /// Neutrino species, e.g. nubar_e or nu_mu
    #[arg(long, default_value = "nubar_e")]
    species: String,

    #[command(flatten)]
    selection: FluxSelectionArgs,

    /// Lower energy bound, e.g. "10 TeV" or a bare number in GeV
    #[arg(long, default_value = "10 TeV")]
    energy_min: String,

    /// Upper energy bound
    #[arg(long, default_value = "1000 EeV")]
    energy_max: String,

    /// Lower zenith bound in radians
    #[arg(long, default_value_t = 0.0)]
    zenith_min: f64,

    /// Upper zenith bound in radians [default: π]
    #[arg(long)]
    zenith_max: Option<f64>,

    /// Lower azimuth bound in radians
    #[arg(long, default_value_t = 0.0)]
    azimuth_min: f64,

    /// Upper azimuth bound in radians [default: 2π]
    #[arg(long)]
    azimuth_max: Option<f64>,

    /// Ignore absorption inside the Earth
    #[arg(long)]
    no_attenuation: bool,

    /// Count only Glashow-resonance interactions
    #[arg(long)]
    resonance_only: bool,

    /// Grid points per integration axis
    #[arg(long)]
    resolution: Option<usize>,

    #[command(flatten)]
    config: ConfigArgs,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args, Debug)]
pub(super) struct CrossSectionArgs {
    /// Neutrino species
    #[arg(long, default_value = "nubar_e")]
    species: String,

    /// Also print σ·n per gram of this medium: earth, ice or water
    #[arg(long)]
    medium: Option<String>,

    /// Energies, e.g. "6.3 PeV" or 1e5 (GeV)
    #[arg(required = true, num_args = 1..)]
    energies: Vec<String>,

    #[command(flatten)]
    config: ConfigArgs,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args, Debug)]
pub(super) struct AttenuationArgs {
    /// Zenith angles in radians
    #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
    zenith: Vec<f64>,

    /// Samples along each chord
    #[arg(long)]
    samples: Option<usize>,

    /// JSON run configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args, Debug)]
pub(super) struct FluxArgs {
    /// Neutrino species
    #[arg(long, default_value = "nubar_e")]
    species: String,

    #[command(flatten)]
    selection: FluxSelectionArgs,

    /// Neutrino energy, e.g. "1 PeV"
    #[arg(long)]
    energy: String,

    /// Zenith angle in radians
    #[arg(long, default_value_t = 0.5 * PI)]
    zenith: f64,

    #[command(flatten)]
    config: ConfigArgs,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct RateOutput {
    species: String,
    flux: FluxKind,
    energy_gev: Bounds,
    zenith: Bounds,
    azimuth: Bounds,
    attenuation: bool,
    resonance_only: bool,
    resolution: usize,
    rate_per_year: f64,
    segments: Vec<SegmentRate>,
}

#[derive(Debug, Serialize)]
struct CrossSectionRow {
    energy_gev: f64,
    cross_sections_cm2: BTreeMap<Channel, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hits_per_gram: Option<f64>,
}

#[derive(Debug, Serialize)]
struct AttenuationRow {
    zenith: f64,
    penetration_length_km: f64,
    column_density_g_cm2: f64,
}

#[derive(Debug, Serialize)]
struct FluxOutput {
    species: String,
    flux: FluxKind,
    energy_gev: f64,
    zenith: f64,
    differential_flux: f64,
}

pub(super) fn run_rate_command(args: RateArgs) -> Result<i32, CliError> {
    let species: NeutrinoSpecies = args.species.parse()?;
    let config = args.config.load(args.resolution)?;
    let flux = args.selection.kind(config.astro)?;

    let query = EventRateQuery {
        zenith: Bounds {
            lower: args.zenith_min,
            upper: args.zenith_max.unwrap_or(PI),
        },
        azimuth: Bounds {
            lower: args.azimuth_min,
            upper: args.azimuth_max.unwrap_or(2.0 * PI),
        },
        flux,
        attenuation: !args.no_attenuation,
        selection: if args.resonance_only {
            ChannelSelection::resonance_only()
        } else {
            ChannelSelection::All
        },
        resolution: config.integration.resolution,
        ..EventRateQuery::default()
    }
    .with_energy(args.energy_min.parse()?, args.energy_max.parse()?);

    let registry = load_registry(config.paths.cross_section_dir.as_deref())?;
    let neutrino = Neutrino::bind(species, &registry)?
        .with_effective_volume_km3(config.detector.effective_volume_km3)?;
    let integrator = EventRateIntegrator::new(
        build_flux_model(config.paths.flux_cache_dir.as_deref()),
        config.attenuation_table()?,
    )
    .with_detector(config.detector_model())?
    .with_min_resonance_nodes(config.integration.min_resonance_nodes)?;

    tracing::info!(species = %species, flux = %query.flux, "integrating event rate");
    let report = integrator.event_rate_report(&neutrino, &query)?;

    if args.json {
        let output = RateOutput {
            species: species.to_string(),
            flux: query.flux.clone(),
            energy_gev: query.energy,
            zenith: query.zenith,
            azimuth: query.azimuth,
            attenuation: query.attenuation,
            resonance_only: args.resonance_only,
            resolution: query.resolution,
            rate_per_year: report.rate_per_year,
            segments: report.segments,
        };
        let rendered =
            serde_json::to_string_pretty(&output).context("failed to render rate report")?;
        println!("{rendered}");
        return Ok(0);
    }

    println!("species: {species}");
    println!("flux: {}", query.flux);
    println!("energy: [{:e}, {:e}] GeV", query.energy.lower, query.energy.upper);
    println!("zenith: {}  azimuth: {}", query.zenith, query.azimuth);
    for segment in &report.segments {
        println!(
            "  segment [{:e}, {:e}] GeV  nodes={}{}  rate={:.6e}/yr",
            segment.energy.lower,
            segment.energy.upper,
            segment.nodes,
            if segment.resonance_window { " (resonance)" } else { "" },
            segment.rate_per_year
        );
    }
    println!("rate: {:.6e} events/year", report.rate_per_year);
    Ok(0)
}

pub(super) fn run_cross_section_command(args: CrossSectionArgs) -> Result<i32, CliError> {
    let species: NeutrinoSpecies = args.species.parse()?;
    let medium = args
        .medium
        .as_deref()
        .map(str::parse::<Medium>)
        .transpose()?;
    let energies = args
        .energies
        .iter()
        .map(|value| value.parse::<Energy>())
        .collect::<Result<Vec<_>, _>>()?;

    let config = args.config.load(None)?;
    let registry = load_registry(config.paths.cross_section_dir.as_deref())?;
    let neutrino = Neutrino::bind(species, &registry)?;

    let rows: Vec<CrossSectionRow> = energies
        .iter()
        .map(|energy| CrossSectionRow {
            energy_gev: energy.gev(),
            cross_sections_cm2: neutrino
                .cross_sections()
                .iter()
                .map(|(channel, table)| (*channel, table.evaluate(*energy)))
                .collect(),
            hits_per_gram: medium.map(|medium| {
                neutrino.cross_section_hits(*energy, medium, &ChannelSelection::All)
            }),
        })
        .collect();

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&rows).context("failed to render cross sections")?;
        println!("{rendered}");
        return Ok(0);
    }

    let channels: Vec<String> = species
        .channels()
        .iter()
        .map(|channel| format!("{:>14}", format!("sigma_{channel}")))
        .collect();
    let hits_header = medium.map_or(String::new(), |medium| {
        format!("{:>14}", format!("hits_{medium}"))
    });
    println!("{:>14}{}{}", "energy_gev", channels.join(""), hits_header);
    for row in &rows {
        let values: String = row
            .cross_sections_cm2
            .values()
            .map(|sigma| format!("{sigma:>14.5e}"))
            .collect();
        let hits = row
            .hits_per_gram
            .map_or(String::new(), |hits| format!("{hits:>14.5e}"));
        println!("{:>14.5e}{values}{hits}", row.energy_gev);
    }
    Ok(0)
}

pub(super) fn run_attenuation_command(args: AttenuationArgs) -> Result<i32, CliError> {
    let config = load_config(&ConfigOverrides {
        config: args.config.clone(),
        ..ConfigOverrides::default()
    })?;
    let samples = args.samples.unwrap_or(config.attenuation.chord_samples);
    if samples == 0 {
        return Err(CliError::Usage(
            "Invalid sample count '0'; expected a positive integer.".to_string(),
        ));
    }
    if let Some(zenith) = args
        .zenith
        .iter()
        .find(|zenith| !(0.0..=PI).contains(*zenith))
    {
        return Err(NufluxError::configuration(
            "CONFIG.ZENITH_BOUNDS",
            format!("zenith angle must lie within [0, π], got {zenith}"),
        )
        .into());
    }

    let rows: Vec<AttenuationRow> = args
        .zenith
        .iter()
        .map(|&zenith| AttenuationRow {
            zenith,
            penetration_length_km: penetration_length(zenith),
            column_density_g_cm2: attenuation_parameter(zenith, samples),
        })
        .collect();

    if args.json {
        let rendered =
            serde_json::to_string_pretty(&rows).context("failed to render column densities")?;
        println!("{rendered}");
        return Ok(0);
    }

    println!("{:>12}{:>18}{:>18}", "zenith_rad", "length_km", "column_g_cm2");
    for row in &rows {
        println!(
            "{:>12.6}{:>18.6e}{:>18.6e}",
            row.zenith, row.penetration_length_km, row.column_density_g_cm2
        );
    }
    Ok(0)
}

pub(super) fn run_flux_command(args: FluxArgs) -> Result<i32, CliError> {
    let species: NeutrinoSpecies = args.species.parse()?;
    let energy: Energy = args.energy.parse()?;
    let config = args.config.load(None)?;
    let kind = args.selection.kind(config.astro)?;

    let model = build_flux_model(config.paths.flux_cache_dir.as_deref());
    let value = model.differential_flux(energy, args.zenith, species, &kind)?;

    if args.json {
        let output = FluxOutput {
            species: species.to_string(),
            flux: kind,
            energy_gev: energy.gev(),
            zenith: args.zenith,
            differential_flux: value,
        };
        let rendered = serde_json::to_string_pretty(&output).context("failed to render flux")?;
        println!("{rendered}");
        return Ok(0);
    }

    println!(
        "{species} {kind} flux at {energy}, zenith {:.6} rad: {value:.6e} GeV^-1 cm^-2 s^-1 sr^-1",
        args.zenith
    );
    Ok(0)
}
