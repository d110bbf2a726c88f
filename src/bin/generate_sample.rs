use anyhow::Context;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// One row of the synthetic inventory, using the city's column names.
#[derive(Serialize)]
struct Row {
    #[serde(rename = "ID")]
    id: u32,
    #[serde(rename = "SPP_COM")]
    species_common: String,
    #[serde(rename = "SPP_BOT")]
    species_botanical: &'static str,
    #[serde(rename = "NUMBEROF_ST")]
    num_stems: u8,
    #[serde(rename = "DBH_RANGE")]
    dbh_range: &'static str,
    #[serde(rename = "DBH")]
    dbh: String,
    #[serde(rename = "DATE_PLANT")]
    date_planted: String,
    #[serde(rename = "NEIGHBORHOOD")]
    neighborhood: &'static str,
    #[serde(rename = "PARK")]
    park: &'static str,
    #[serde(rename = "OS_ID")]
    park_id: String,
    #[serde(rename = "ADDRESS")]
    address: String,
    #[serde(rename = "STREET")]
    street: &'static str,
    #[serde(rename = "SUFFIX")]
    suffix: &'static str,
    #[serde(rename = "X_LONGITUDE")]
    longitude: String,
    #[serde(rename = "Y_LATITUDE")]
    latitude: String,
}

/// (common name, botanical name, mean diameter, relative frequency)
const SPECIES: [(&str, &str, f64, u32); 12] = [
    ("Honeylocust", "Gleditsia triacanthos", 11.0, 18),
    ("Norway Maple", "Acer platanoides", 16.0, 14),
    ("Littleleaf Linden", "Tilia cordata", 12.0, 12),
    ("London Planetree", "Platanus x acerifolia", 18.0, 10),
    ("Pin Oak", "Quercus palustris", 17.0, 8),
    ("Red Maple", "Acer rubrum", 10.0, 8),
    ("Callery Pear", "Pyrus calleryana", 9.0, 7),
    ("Japanese Zelkova", "Zelkova serrata", 8.0, 6),
    ("Red Oak", "Quercus rubra", 15.0, 6),
    ("American Elm", "Ulmus americana", 20.0, 4),
    ("Ginkgo", "Ginkgo biloba", 7.0, 4),
    ("Kwanzan Cherry", "Prunus serrulata", 6.0, 3),
];

/// (name, latitude, longitude) of a rough neighborhood center.
const NEIGHBORHOODS: [(&str, f64, f64); 8] = [
    ("Allston", 42.3539, -71.1337),
    ("Back Bay", 42.3503, -71.0810),
    ("Charlestown", 42.3782, -71.0602),
    ("Dorchester", 42.3016, -71.0676),
    ("Fenway", 42.3429, -71.1003),
    ("Jamaica Plain", 42.3097, -71.1151),
    ("Roxbury", 42.3152, -71.0914),
    ("South End", 42.3388, -71.0765),
];

const STREETS: [(&str, &str); 8] = [
    ("Beacon", "St"),
    ("Commonwealth", "Ave"),
    ("Centre", "St"),
    ("Washington", "St"),
    ("Blue Hill", "Ave"),
    ("Tremont", "St"),
    ("Harvard", "Ave"),
    ("Dorchester", "Ave"),
];

const PARKS: [&str; 4] = ["", "", "Franklin Park", "Boston Common"];

/// Box-Muller transform for a normal sample.
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

fn dbh_range(dbh: f64) -> &'static str {
    match dbh {
        d if d < 6.0 => "0-6",
        d if d < 12.0 => "6-12",
        d if d < 24.0 => "12-24",
        _ => "24+",
    }
}

fn main() -> anyhow::Result<()> {
    let mut rng = StdRng::seed_from_u64(42);
    let n_trees = 5000;
    let total_weight: u32 = SPECIES.iter().map(|s| s.3).sum();

    let output_path = "bprd_trees.csv";
    let mut writer =
        csv::Writer::from_path(output_path).with_context(|| format!("Failed to create {output_path}"))?;

    for id in 1..=n_trees {
        let mut pick = rng.gen_range(0..total_weight);
        let &(common, botanical, mean_dbh, _) = SPECIES
            .iter()
            .find(|s| {
                if pick < s.3 {
                    true
                } else {
                    pick -= s.3;
                    false
                }
            })
            .unwrap_or(&SPECIES[0]);
        let &(neighborhood, lat0, lon0) = NEIGHBORHOODS.choose(&mut rng).unwrap_or(&NEIGHBORHOODS[0]);
        let &(street, suffix) = STREETS.choose(&mut rng).unwrap_or(&STREETS[0]);
        let park = PARKS.choose(&mut rng).copied().unwrap_or_default();

        let dbh = gauss(&mut rng, mean_dbh, mean_dbh / 3.0).max(1.0);
        let noise: f64 = rng.gen();

        // A few messy rows, as found in the real export.
        let dbh_text = match noise {
            x if x < 0.03 => String::new(),
            x if x < 0.04 => "n/a".to_string(),
            _ => format!("{:.0}", dbh),
        };
        let (longitude, latitude) = if noise > 0.985 {
            (String::new(), String::new())
        } else {
            (
                format!("{:.6}", lon0 + gauss(&mut rng, 0.0, 0.008)),
                format!("{:.6}", lat0 + gauss(&mut rng, 0.0, 0.006)),
            )
        };
        let species_common = if noise > 0.95 {
            format!("  {common} ")
        } else {
            common.to_string()
        };
        let year = rng.gen_range(1995..=2023);
        let month = rng.gen_range(1..=12);
        let day = rng.gen_range(1..=28);
        let date_planted = if id % 3 == 0 {
            format!("{year}/{month:02}/{day:02} 00:00:00+00")
        } else if noise < 0.1 {
            String::new()
        } else {
            format!("{year}-{month:02}-{day:02}")
        };

        writer.serialize(Row {
            id,
            species_common,
            species_botanical: botanical,
            num_stems: if rng.gen_bool(0.9) { 1 } else { rng.gen_range(2..=4) },
            dbh_range: dbh_range(dbh),
            dbh: dbh_text,
            date_planted,
            neighborhood,
            park,
            park_id: if park.is_empty() { String::new() } else { format!("OS-{}", park.len()) },
            address: rng.gen_range(1..400).to_string(),
            street,
            suffix,
            longitude,
            latitude,
        })?;
    }
    writer.flush()?;

    println!("Wrote {n_trees} trees to {output_path}");
    Ok(())
}
