use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;
use trm_rank::backends::EmbeddingCache;
use trm_rank::cli::{resolve_sheet, resolve_strategies, Cli, Commands};
use trm_rank::config::Config;
use trm_rank::error::{Result, TrmError};
use trm_rank::matcher::{self, RunOptions, StrategyBuilder};
use trm_rank::{export, source};
use trm_rank_common::AnalysisResults;

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    match cli.command {
        Commands::Rank {
            input,
            normalized,
            strategy,
            format,
            output,
            top,
            input_sheet,
            normalized_sheet,
            sheet,
            use_cache,
            sequential,
        } => {
            println!("🔎 trm-rank - 類似度ランキング\n");

            // 1. ラベル読み込み
            println!("[1/3] ラベルを読み込み中...");
            let normalized_sheet = resolve_sheet(normalized_sheet, sheet.as_deref());
            let input_sheet = resolve_sheet(input_sheet, sheet.as_deref());
            let reference = source::load_labels(&normalized, normalized_sheet.as_deref())?;
            let inputs = source::load_labels(&input, input_sheet.as_deref())?;
            println!(
                "✔ 入力 {}件 / 正規化 {}件\n",
                inputs.len(),
                reference.len()
            );

            // 2. 戦略ごとにランキング
            let kinds = resolve_strategies(&strategy);
            println!(
                "[2/3] ランキング中... ({}){}",
                kinds.iter().map(|k| k.to_string()).collect::<Vec<_>>().join(", "),
                if use_cache { " (キャッシュ有効)" } else { "" }
            );

            let cache_dir = Config::cache_dir()?;
            let cache = use_cache.then(|| Arc::new(Mutex::new(EmbeddingCache::load(&cache_dir))));

            let mut builder = StrategyBuilder::new(&config);
            if let Some(cache) = &cache {
                builder = builder.with_cache(cache.clone());
            }

            let options = RunOptions {
                parallel: !sequential,
                show_progress: !cli.verbose,
            };
            let outcomes =
                matcher::run_strategies(&kinds, &inputs, &reference, options, |kind| builder.build(kind));

            for outcome in &outcomes {
                match &outcome.result {
                    Ok(report) => println!("✔ {}: {}件", outcome.kind.title(), report.len()),
                    Err(e) => println!("✘ {}: {}", outcome.kind.title(), e),
                }
            }

            if let Some(cache) = &cache {
                let cache = cache.lock().unwrap_or_else(|e| e.into_inner());
                if let Err(e) = cache.save(&cache_dir) {
                    tracing::warn!(error = %e, "キャッシュ保存に失敗");
                }
            }

            let reports = matcher::successful_reports(outcomes);
            if reports.is_empty() {
                return Err(TrmError::AllStrategiesFailed);
            }
            println!();

            // 3. 出力
            println!("[3/3] 結果を出力中...");
            let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
            let title = export::report_title(input.file_stem().and_then(|s| s.to_str()));
            export::export_reports(&reports, &format, &output_dir, &title, top)?;

            println!("\n✅ 完了");
        }

        Commands::Report { input, output, name } => {
            println!("📄 trm-rank - 分析レポート\n");

            if !input.exists() {
                return Err(TrmError::FileNotFound(input.display().to_string()));
            }
            let content = std::fs::read_to_string(&input)?;
            let mut results: AnalysisResults = serde_json::from_str(&content)?;
            if let Some(name) = name {
                results.name = name;
            }

            let output_dir = output.unwrap_or_else(|| PathBuf::from("."));
            let title = export::report_title(Some(&results.name));
            let path = export::output_path_for_format(&output_dir, &title, "xlsx");

            println!("- Excelを生成中...");
            let sheets = export::write_analysis_report(&results, &path)?;
            println!("✔ Excel出力: {} ({}シート)", path.display(), sheets);

            println!("\n✅ レポート生成完了");
        }

        Commands::Config {
            set_embedding_endpoint,
            set_embedding_model,
            set_api_key,
            set_word_vectors,
            set_wordnet_dir,
            show,
        } => {
            let mut config = config;
            let mut changed = false;

            if let Some(endpoint) = set_embedding_endpoint {
                config.embedding_endpoint = endpoint;
                changed = true;
            }
            if let Some(model) = set_embedding_model {
                config.embedding_model = model;
                changed = true;
            }
            if let Some(key) = set_api_key {
                config.api_key = Some(key);
                changed = true;
            }
            if let Some(path) = set_word_vectors {
                config.word_vectors_path = Some(path);
                changed = true;
            }
            if let Some(dir) = set_wordnet_dir {
                config.wordnet_dir = Some(dir);
                changed = true;
            }

            if changed {
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                print_config(&config);
            }
        }

        Commands::Cache { clear, info } => {
            let target = Config::cache_dir()?;
            let cache_path = EmbeddingCache::cache_path(&target);

            if info || !clear {
                if cache_path.exists() {
                    let cache = EmbeddingCache::load(&target);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match EmbeddingCache::clear(&target) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}

fn print_config(config: &Config) {
    let path_or_unset = |p: Option<&Path>| {
        p.map(|p| p.display().to_string())
            .unwrap_or_else(|| "未設定".to_string())
    };

    println!("設定:");
    println!("  埋め込みエンドポイント: {}", config.embedding_endpoint);
    println!("  埋め込みモデル: {}", config.embedding_model);
    println!("  バッチサイズ: {}", config.embedding_batch_size);
    println!("  タイムアウト: {}秒", config.timeout_seconds);
    println!(
        "  APIキー: {}",
        if config.get_api_key().is_some() { "設定済み" } else { "未設定" }
    );
    println!("  単語ベクトル: {}", path_or_unset(config.word_vectors_path.as_deref()));
    println!(
        "  WordNet辞書: {}",
        path_or_unset(config.get_wordnet_dir().ok().as_deref())
    );
}
