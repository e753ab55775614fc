use std::fs;
use std::path::PathBuf;

use clap::Parser;

mod rng;

use rng::CountRng;

/// Write a directory of synthetic per-gene replicate count CSVs.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    #[arg(short = 'o', long = "out", default_value = "sample_genes")]
    out: PathBuf,
    #[arg(long = "rows", default_value_t = 12)]
    rows: usize,
    #[arg(long = "seed", default_value_t = 42)]
    seed: u64,
}

const SAMPLES: [&str; 6] = ["M1", "M2", "M3", "Y1", "Y2", "Y3"];

/// Which of the six samples get noisy (above-threshold) counts.
const PROFILES: [(&str, [bool; 6]); 5] = [
    ("common", [true; 6]),
    ("mfd", [true, true, true, false, false, false]),
    ("yb", [false, false, false, true, true, true]),
    ("partial", [true, false, false, false, false, false]),
    ("quiet", [false; 6]),
];

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut rng = CountRng::new(args.seed);
    fs::create_dir_all(&args.out)?;

    let header: Vec<String> = SAMPLES
        .iter()
        .flat_map(|s| [format!("{s}_feature"), format!("{s}_pos"), format!("{s}_count")])
        .collect();

    let mut written = 0;
    for (name, noisy) in PROFILES {
        for k in 0..3 {
            let gene = format!("{name}{k}");
            let mut body = header.join(",");
            body.push('\n');

            for row in 0..args.rows {
                let cells: Vec<String> = SAMPLES
                    .iter()
                    .zip(noisy)
                    .map(|(sample, noisy)| {
                        let value = rng.count(200.0 + 50.0 * k as f64, noisy);
                        // One unparseable token so the malformed-row path is exercised.
                        let value = if name == "quiet" && k == 0 && row == 3 && *sample == "M2" {
                            "n/a".to_string()
                        } else {
                            value.to_string()
                        };
                        format!("{gene}_{sample},{},{value}", row * 10)
                    })
                    .collect();
                body.push_str(&cells.join(","));
                body.push('\n');
            }

            fs::write(args.out.join(format!("{gene}.csv")), body)?;
            written += 1;
        }
    }

    println!("Wrote {written} gene files ({} rows each) to {}", args.rows, args.out.display());
    Ok(())
}
