use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::json;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn pick(&mut self, n: usize) -> usize {
        ((self.next_f64() * n as f64) as usize).min(n - 1)
    }
}

/// A few Rondônia municipalities: (code, name, center lon, center lat).
const MUNICIPALITIES: &[(i64, &str, f64, f64)] = &[
    (1100015, "Alta Floresta D'Oeste", -61.99, -11.93),
    (1100023, "Ariquemes", -63.03, -9.91),
    (1100031, "Cabixi", -60.54, -13.49),
    (1100049, "Cacoal", -61.44, -11.43),
    (1100056, "Cerejeiras", -60.81, -13.19),
    (1100064, "Colorado do Oeste", -60.54, -13.11),
    (1100072, "Corumbiara", -61.05, -12.99),
    (1100080, "Costa Marques", -64.22, -12.44),
];

const INCOME_CODES: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q',
];

const HEADER: [&str; 14] = [
    "NU_NOTA_CH",
    "NU_NOTA_CN",
    "NU_NOTA_MT",
    "NU_NOTA_LC",
    "NU_NOTA_REDACAO",
    "TP_PRESENCA_CH",
    "TP_PRESENCA_CN",
    "TP_PRESENCA_MT",
    "TP_PRESENCA_LC",
    "Q006",
    "TP_ANO_CONCLUIU",
    "TP_COR_RACA",
    "TP_FAIXA_ETARIA",
    "CO_MUNICIPIO_PROVA",
];

const ROWS_PER_YEAR: usize = 400;

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let data_dir = Path::new("data");
    fs::create_dir_all(data_dir).context("creating data directory")?;

    for year in 2020..=2024u16 {
        let csv_bytes = year_csv(year, &mut rng)?;
        if year == 2020 {
            // One year ships zipped so the archive path gets exercised too.
            let path = data_dir.join(format!("enem_{year}.zip"));
            write_zipped(&path, &format!("enem_{year}.csv"), &csv_bytes)
                .with_context(|| format!("writing {}", path.display()))?;
        } else {
            let path = data_dir.join(format!("enem_{year}.csv"));
            fs::write(&path, &csv_bytes)
                .with_context(|| format!("writing {}", path.display()))?;
        }
    }

    let boundary_path = data_dir.join("municipios.geojson");
    write_boundaries(&boundary_path).context("writing boundary document")?;

    println!(
        "Wrote 5 yearly extracts ({ROWS_PER_YEAR} rows each) and {} municipality boundaries under data/",
        MUNICIPALITIES.len()
    );
    Ok(())
}

/// Attendance code with realistic weights: mostly present, a few absences,
/// the odd elimination.
fn presence_code(rng: &mut SimpleRng) -> u8 {
    let roll = rng.next_f64();
    if roll < 0.89 {
        1
    } else if roll < 0.97 {
        0
    } else {
        2
    }
}

fn score(rng: &mut SimpleRng, present: bool, base: f64) -> Option<f64> {
    present.then(|| rng.gauss(base, 85.0).clamp(0.0, 1000.0))
}

fn fmt_score(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_default()
}

fn year_csv(year: u16, rng: &mut SimpleRng) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for _ in 0..ROWS_PER_YEAR {
        // Squaring the roll tilts the draw toward the low brackets.
        let income_index = ((rng.next_f64().powi(2)) * INCOME_CODES.len() as f64) as usize;
        let income_index = income_index.min(INCOME_CODES.len() - 1);
        let income = INCOME_CODES[income_index];
        let age_bracket = 1 + ((rng.next_f64().powi(2) * 20.0) as u8).min(19);
        let completion = (rng.next_f64() * 17.0) as u8;
        let race = (rng.next_f64() * 6.0) as u8;
        let municipality = if rng.next_f64() < 0.02 {
            None
        } else {
            Some(MUNICIPALITIES[rng.pick(MUNICIPALITIES.len())].0)
        };

        // Day 1 carries Languages, Humanities, and Writing; day 2 the rest.
        let day1 = presence_code(rng);
        let day2 = presence_code(rng);
        let base = 470.0 + income_index as f64 * 7.0 + (year as f64 - 2020.0) * 2.0;

        let nota_ch = score(rng, day1 == 1, base);
        let nota_cn = score(rng, day2 == 1, base - 10.0);
        let nota_mt = score(rng, day2 == 1, base + 15.0);
        let nota_lc = score(rng, day1 == 1, base);
        // Writing occasionally missing even for present candidates, which
        // keeps the all-subjects-required exclusion visible in the output.
        let redacao_present = day1 == 1 && rng.next_f64() > 0.03;
        let nota_redacao = score(rng, redacao_present, base + 30.0);

        writer.write_record([
            fmt_score(nota_ch),
            fmt_score(nota_cn),
            fmt_score(nota_mt),
            fmt_score(nota_lc),
            fmt_score(nota_redacao),
            day1.to_string(),
            day2.to_string(),
            day2.to_string(),
            day1.to_string(),
            income.to_string(),
            completion.to_string(),
            race.to_string(),
            age_bracket.to_string(),
            municipality.map(|m| m.to_string()).unwrap_or_default(),
        ])?;
    }

    writer.flush().context("flushing generated CSV")?;
    writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("finalizing generated CSV: {e}"))
}

fn write_zipped(path: &Path, entry_name: &str, bytes: &[u8]) -> Result<()> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer.start_file(entry_name, zip::write::SimpleFileOptions::default())?;
    writer.write_all(bytes)?;
    let cursor = writer.finish()?;
    fs::write(path, cursor.into_inner())?;
    Ok(())
}

fn write_boundaries(path: &Path) -> Result<()> {
    let half = 0.12;
    let features: Vec<serde_json::Value> = MUNICIPALITIES
        .iter()
        .map(|&(code, name, lon, lat)| {
            json!({
                "type": "Feature",
                "properties": { "codarea": format!("{code:07}"), "name": name },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [lon - half, lat - half],
                        [lon + half, lat - half],
                        [lon + half, lat + half],
                        [lon - half, lat + half],
                        [lon - half, lat - half],
                    ]]
                }
            })
        })
        .collect();

    let document = json!({ "type": "FeatureCollection", "features": features });
    fs::write(path, serde_json::to_string_pretty(&document)?)?;
    Ok(())
}
