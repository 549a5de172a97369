use clap::{Arg, Command};
use interceptsim::logging::{self, LogConfig, LogOutput};
use interceptsim::scenario::ScenarioConfig;
use interceptsim::simulation::SimulationEngine;
use tracing::info;

fn main() {
    let matches = Command::new("interceptsim")
        .version("0.1.0")
        .about("ミサイル攻撃／防衛デモ (Missile Attack/Defense Demo)")
        .long_about("攻撃・防衛・監視の3タスクが協調し、ミサイルの発射・迎撃・着弾を\n\
                     固定周期の物理更新で模擬します。")
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("シナリオファイル(.yaml)のパスを指定")
                .long_help("実行するシナリオファイル(.yaml)のパスを指定します。\n\
                           指定しない場合、組み込みの既定値で実行されます。")
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .action(clap::ArgAction::SetTrue)
                .help("シナリオの情報のみ表示して終了")
        )
        .arg(
            Arg::new("ticks")
                .short('n')
                .long("ticks")
                .value_name("N")
                .value_parser(clap::value_parser!(u64))
                .help("監視タスクの最大ティック数（省略時はシナリオ設定、無制限なら Ctrl-C まで）")
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_name("SEED")
                .value_parser(clap::value_parser!(u64))
                .help("乱数シードを上書き")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(clap::ArgAction::Count)
                .help("詳細出力レベル (-v: デバッグ, -vv: トレース)")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("ログレベル (trace, debug, info, warn, error)。-v より優先")
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("OUTPUT")
                .value_parser(clap::value_parser!(LogOutput))
                .default_value("console")
                .help("ログ出力先 (console, file, both)")
        )
        .arg(
            Arg::new("log-dir")
                .long("log-dir")
                .value_name("DIR")
                .default_value("logs")
                .help("ログファイルの出力ディレクトリ")
        )
        .get_matches();

    println!("ミサイル攻撃／防衛デモ - interceptsim v0.1.0");
    println!();

    let verbose_level = matches.get_count("verbose");
    let level = match matches.get_one::<String>("log-level") {
        Some(level) => logging::parse_log_level(level),
        None => logging::level_from_verbosity(verbose_level),
    };
    let log_config = LogConfig {
        level,
        output: *matches.get_one::<LogOutput>("log-output").unwrap_or(&LogOutput::Console),
        log_dir: matches
            .get_one::<String>("log-dir")
            .cloned()
            .unwrap_or_else(|| "logs".to_string()),
        ..LogConfig::default()
    };

    // ファイル出力のバッファを保持するため main の終わりまで生かす
    let _log_guard = match logging::init_logging(log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("ログ初期化エラー: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&matches) {
        eprintln!("エラー: {}", e);
        std::process::exit(1);
    }
}

fn run(matches: &clap::ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let mut scenario = match matches.get_one::<String>("scenario") {
        Some(path) => {
            let scenario = ScenarioConfig::from_file(path)?;
            info!("シナリオファイル読み込み完了: {}", path);
            scenario
        }
        None => ScenarioConfig::default(),
    };

    if let Some(seed) = matches.get_one::<u64>("seed") {
        scenario.sim.seed = *seed;
    }
    if let Some(ticks) = matches.get_one::<u64>("ticks") {
        scenario.sim.max_ticks = Some(*ticks);
    }

    scenario.print_summary();
    println!();

    if matches.get_flag("info") {
        return Ok(());
    }

    execute_scenario(scenario)
}

/// シナリオの実行
fn execute_scenario(scenario: ScenarioConfig) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let max_ticks = scenario.sim.max_ticks;
    let engine = SimulationEngine::new(scenario);
    let stats = runtime.block_on(engine.run(max_ticks));

    println!();
    println!("=== 集計結果 ===");
    println!("発射ミサイル数: {}", stats.missiles_launched);
    println!("発射迎撃機数: {}", stats.interceptors_launched);
    println!("防衛エリア着弾数: {}", stats.area_hits);
    println!("迎撃成功数: {}", stats.intercepts);

    Ok(())
}
