use clap::Parser;
use hydromap::{GenerationConfig, Seed, run_solver};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// Генератор гидрологии и подбор параметров карты
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к конфигурационному файлу в формате TOML
    #[arg(short, long)]
    config: PathBuf,

    /// Путь для сохранения результата в JSON (по умолчанию: ./hydromap.json)
    #[arg(short, long, default_value = "hydromap.json")]
    output: PathBuf,

    /// Переопределяет число итераций решателя из конфигурации
    #[arg(short, long)]
    max_iterations: Option<usize>,

    /// Переопределяет сид из конфигурации
    #[arg(short, long)]
    seed: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    println!("🔍 Загрузка конфигурации...");
    let path = cli.config.to_str().ok_or("путь к конфигурации не в UTF-8")?;
    let mut config = GenerationConfig::from_toml_file(path)?;
    if let Some(max_iterations) = cli.max_iterations {
        config.solver.max_iterations = max_iterations;
    }
    if let Some(seed) = cli.seed {
        config.seed = Seed::Text(seed);
    }

    println!(
        "Подбор карты (размер: {}×{}, биом: {:?}, сид: {})...",
        config.width, config.height, config.biome, config.seed
    );
    let outcome = run_solver(&config);

    let solve = &outcome.solve;
    println!(
        "Итераций: {}, статус: {:?}, лучшая оценка: {}",
        solve.iterations,
        solve.status,
        solve.best_score.map_or_else(|| "—".to_owned(), |s| format!("{s:.4}"))
    );
    for message in &solve.messages {
        println!("  • {message}");
    }
    if solve.rolled_back {
        println!("Параметры возвращены к лучшей итерации");
    }

    let stats = outcome.map.hydrology.stats();
    let metrics = &outcome.map.metrics;
    println!(
        "Суша {:.1}%, руда {:.1}%, океан {}, озёр {} ({} клеток), рек {}, болот {}",
        metrics.land_ratio * 100.0,
        metrics.ore_ratio * 100.0,
        stats.ocean_tiles,
        stats.lake_count,
        stats.lake_tiles,
        stats.river_tiles,
        stats.marsh_tiles
    );
    if solve.dirty.full {
        println!("Перерисовка: вся карта");
    } else {
        println!("Перерисовка: чанков {}", solve.dirty.chunks.len());
    }

    println!("Сохранение в {:?}", cli.output);
    let writer = BufWriter::new(File::create(&cli.output)?);
    outcome.write_json(writer)?;

    println!("\nГотово! Карта сохранена.");
    Ok(())
}
