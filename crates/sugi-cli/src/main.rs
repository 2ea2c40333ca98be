//! `sugi`: command-line front end for the heuristic engine (§6.3). Manual
//! flag parsing, no argument-parsing crate pulled in for a handful of flags.

use std::collections::VecDeque;
use std::io::Read as _;
use std::time::Duration;
use sugi_core::config::{HeuristicKind, MceMode, WeightCarryPolicy};
use sugi_core::heuristic::{postprocess_swaps, Engine};
use sugi_core::weight::Orientation;
use sugi_core::{EngineConfig, Graph, NodeId, Objective};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Parse(sugi_io::Error),
    Engine(sugi_core::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Parse(err) => write!(f, "{err}"),
            CliError::Engine(err) => write!(f, "{err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<sugi_io::Error> for CliError {
    fn from(value: sugi_io::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<sugi_core::Error> for CliError {
    fn from(value: sugi_core::Error) -> Self {
        Self::Engine(value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Preprocessor {
    #[default]
    None,
    Bfs,
    Dfs,
    Mds,
}

fn parse_preprocessor(s: &str) -> Option<Preprocessor> {
    match s {
        "none" => Some(Preprocessor::None),
        "bfs" => Some(Preprocessor::Bfs),
        "dfs" => Some(Preprocessor::Dfs),
        "mds" => Some(Preprocessor::Mds),
        _ => None,
    }
}

fn parse_heuristic(s: &str) -> Option<HeuristicKind> {
    match s {
        "median" => Some(HeuristicKind::Median),
        "bary" => Some(HeuristicKind::Barycenter),
        "mod_bary" => Some(HeuristicKind::ModBarycenter),
        "mcn" => Some(HeuristicKind::Mcn),
        "sifting" => Some(HeuristicKind::Sifting),
        "mce" => Some(HeuristicKind::Mce),
        "mce_s" => Some(HeuristicKind::MceS),
        "mse" => Some(HeuristicKind::Mse),
        _ => None,
    }
}

fn parse_objective(s: &str) -> Option<Objective> {
    match s {
        "t" => Some(Objective::TotalCrossings),
        "b" => Some(Objective::BottleneckCrossings),
        "s" => Some(Objective::TotalStretch),
        "bs" => Some(Objective::BottleneckStretch),
        _ => None,
    }
}

fn parse_pareto(s: &str) -> Option<Option<(Objective, Objective)>> {
    match s {
        "none" => Some(None),
        "bottleneck-total" => Some(Some((Objective::TotalCrossings, Objective::BottleneckCrossings))),
        "stretch-total" => Some(Some((Objective::TotalCrossings, Objective::TotalStretch))),
        "bottleneck-stretch" => Some(Some((Objective::BottleneckCrossings, Objective::BottleneckStretch))),
        _ => None,
    }
}

#[derive(Debug, Default)]
struct Args {
    dot_path: Option<String>,
    ord_path: Option<String>,
    sgf_path: Option<String>,
    preprocess: Preprocessor,
    heuristic: Option<HeuristicKind>,
    max_iterations: Option<u64>,
    max_runtime: Option<f64>,
    seed: u64,
    pareto: Option<(Objective, Objective)>,
    objective: Option<Objective>,
    out: Option<String>,
    verbose: bool,
    trace_every: u64,
    randomize_sifting: bool,
    balanced_weight: bool,
    capture_iteration: Option<u64>,
    capture_out: Option<String>,
}

fn usage() -> &'static str {
    "sugi\n\
\n\
USAGE:\n\
  sugi --input <dot-file> <ord-file> [options]\n\
  sugi --sgf <file> [options]\n\
\n\
OPTIONS:\n\
  --preprocess {none,bfs,dfs,mds}           initial-order permutation (default: none)\n\
  --heuristic {median,bary,mod_bary,mcn,sifting,mce,mce_s,mse}  (default: bary)\n\
  --max-iterations <n>                      stop after n passes\n\
  --max-runtime <seconds>                    stop after this much wall-clock time\n\
  --seed <u64>                               RNG seed (default: 0)\n\
  --pareto {none,bottleneck-total,stretch-total,bottleneck-stretch}\n\
  --objective {t,b,s,bs}                     which tracked best to restore and write (default: t)\n\
  --out <base>                               output base path (default: SGF to stdout)\n\
  --verbose, -v                              enable debug-level tracing\n\
  --trace-every <n>                          log one pass event per n passes (default: 1)\n\
  --randomize-sifting                        re-shuffle degree ties every `sifting` pass\n\
  --balanced-weight                          mod_bary: average the up/down barycenters instead of pooling them\n\
  --capture-iteration <n> --capture-out <file>  write the order as SGF the moment iteration n is reached\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        trace_every: 1,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "--input" => {
                let (Some(dot), Some(ord)) = (it.next(), it.next()) else {
                    return Err(CliError::Usage(usage()));
                };
                args.dot_path = Some(dot.clone());
                args.ord_path = Some(ord.clone());
            }
            "--sgf" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.sgf_path = Some(path.clone());
            }
            "--preprocess" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.preprocess = parse_preprocessor(v).ok_or(CliError::Usage(usage()))?;
            }
            "--heuristic" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.heuristic = Some(parse_heuristic(v).ok_or(CliError::Usage(usage()))?);
            }
            "--max-iterations" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.max_iterations = Some(v.parse().map_err(|_| CliError::Usage(usage()))?);
            }
            "--max-runtime" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.max_runtime = Some(v.parse().map_err(|_| CliError::Usage(usage()))?);
            }
            "--seed" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.seed = v.parse().map_err(|_| CliError::Usage(usage()))?;
            }
            "--pareto" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.pareto = parse_pareto(v).ok_or(CliError::Usage(usage()))?;
            }
            "--objective" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.objective = Some(parse_objective(v).ok_or(CliError::Usage(usage()))?);
            }
            "--out" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(v.clone());
            }
            "--trace-every" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.trace_every = v.parse().map_err(|_| CliError::Usage(usage()))?;
            }
            "--verbose" | "-v" => args.verbose = true,
            "--randomize-sifting" => args.randomize_sifting = true,
            "--balanced-weight" => args.balanced_weight = true,
            "--capture-iteration" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.capture_iteration = Some(v.parse().map_err(|_| CliError::Usage(usage()))?);
            }
            "--capture-out" => {
                let Some(v) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.capture_out = Some(v.clone());
            }
            _ => return Err(CliError::Usage(usage())),
        }
    }

    if args.sgf_path.is_none() && (args.dot_path.is_none() || args.ord_path.is_none()) {
        return Err(CliError::Usage(usage()));
    }
    if args.capture_iteration.is_some() != args.capture_out.is_some() {
        return Err(CliError::Usage(usage()));
    }

    Ok(args)
}

/// Breadth-first visit order rooted at layer-0 nodes (ascending id),
/// following `up_edges` only — the same traversal shape as
/// [`sugi_core::weight::Graph::assign_dfs_preorder`], but queue-based
/// instead of stack-based, per SPEC_FULL.md Open Question 3.
fn bfs_order(graph: &Graph) -> Vec<u32> {
    let mut order: Vec<Option<u32>> = vec![None; graph.nodes.len()];
    let mut counter = 0u32;
    let mut queue: VecDeque<NodeId> = VecDeque::new();
    for layer in 0..graph.num_layers() {
        for &start in &graph.layer(layer).nodes.clone() {
            if order[start.index()].is_some() {
                continue;
            }
            order[start.index()] = Some(counter);
            counter += 1;
            queue.push_back(start);
            while let Some(v) = queue.pop_front() {
                let next: Vec<NodeId> = graph.node(v).up_edges.iter().map(|&e| graph.edge(e).up).collect();
                for n in next {
                    if order[n.index()].is_none() {
                        order[n.index()] = Some(counter);
                        counter += 1;
                        queue.push_back(n);
                    }
                }
            }
        }
    }
    order.into_iter().map(|o| o.expect("every node visited from some layer-0 root")).collect()
}

/// Applies the chosen initial-order permutation (§6.3's preprocessor
/// choice) before handing the graph to the engine. Not part of `sugi-core`
/// (SPEC_FULL.md Open Question 3): the engine only ever consumes an
/// already-laid-out-into-layers graph.
fn apply_preprocessor(graph: &mut Graph, kind: Preprocessor) {
    match kind {
        Preprocessor::None => {}
        Preprocessor::Bfs => {
            let order = bfs_order(graph);
            for node in &mut graph.nodes {
                node.weight = Some(order[node.id.index()] as f64);
            }
            for layer in 0..graph.num_layers() {
                graph.layer_sort(layer, false);
            }
        }
        Preprocessor::Dfs => {
            graph.assign_dfs_preorder();
            for node in &mut graph.nodes {
                node.weight = node.preorder.map(|p| p as f64);
            }
            for layer in 0..graph.num_layers() {
                graph.layer_sort(layer, false);
            }
        }
        Preprocessor::Mds => {
            // "Median-heuristic-seeded": one alternating median sweep used
            // purely to seed the initial order, not to run to convergence.
            let num_layers = graph.num_layers();
            for layer in 1..num_layers {
                graph.assign_median(layer, Orientation::Down, WeightCarryPolicy::Left);
                graph.layer_sort(layer, false);
            }
            for layer in (0..num_layers.saturating_sub(1)).rev() {
                graph.assign_median(layer, Orientation::Up, WeightCarryPolicy::Left);
                graph.layer_sort(layer, false);
            }
        }
    }
}

fn read_to_string(path: &str) -> std::io::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
    }
}

fn write_output(graph: &Graph, args: &Args) -> Result<(), CliError> {
    let is_dot_ord = args.dot_path.is_some();
    match &args.out {
        Some(base) if is_dot_ord => {
            let (dot, ord) = sugi_io::dot_ord::write(graph);
            std::fs::write(format!("{base}.dot"), dot)?;
            std::fs::write(format!("{base}.ord"), ord)?;
        }
        Some(base) => {
            let mut f = std::fs::File::create(format!("{base}.sgf"))?;
            sugi_io::sgf::write(graph, &mut f)?;
        }
        None => {
            let mut out = std::io::stdout().lock();
            sugi_io::sgf::write(graph, &mut out)?;
        }
    }
    Ok(())
}

fn run(args: Args, argv: &[String]) -> Result<(), CliError> {
    let mut graph = if let Some(sgf_path) = &args.sgf_path {
        let text = read_to_string(sgf_path)?;
        sugi_io::sgf::parse(&text)?
    } else {
        let dot = read_to_string(args.dot_path.as_deref().expect("checked in parse_args"))?;
        let ord = read_to_string(args.ord_path.as_deref().expect("checked in parse_args"))?;
        sugi_io::dot_ord::parse(&dot, &ord)?
    };

    // §6.4: the comment buffer accumulates the command line, unchanged
    // otherwise, and is propagated to every output file.
    if !graph.comment.is_empty() {
        graph.comment.push('\n');
    }
    graph.comment.push_str(&argv.join(" "));

    apply_preprocessor(&mut graph, args.preprocess);

    let objective = args.objective.unwrap_or(Objective::TotalCrossings);
    let config = EngineConfig {
        heuristic: args.heuristic.unwrap_or(HeuristicKind::Barycenter),
        primary_objective: objective,
        pareto_pair: args.pareto,
        max_iterations: args.max_iterations,
        max_runtime: args.max_runtime.map(Duration::from_secs_f64),
        seed: args.seed,
        weight_carry: WeightCarryPolicy::Left,
        balanced_weight: args.balanced_weight,
        mce_mode: MceMode::Nodes,
        sift_randomize: args.randomize_sifting,
        trace_every: args.trace_every.max(1),
        capture_iteration: args.capture_iteration,
    };

    let mut engine = Engine::new(graph, config);
    if let Some(capture_out) = args.capture_out.clone() {
        engine.set_capture_writer(move |graph, iteration| {
            match std::fs::File::create(&capture_out).and_then(|mut f| sugi_io::sgf::write(graph, &mut f)) {
                Ok(()) => tracing::debug!(iteration, path = %capture_out, "captured order to file"),
                Err(err) => tracing::warn!(iteration, path = %capture_out, %err, "failed to write captured order"),
            }
        });
    }
    let report = engine.run();
    tracing::info!(
        termination = ?report.termination,
        passes = report.passes,
        best = report.best,
        "optimization finished"
    );

    // Post-processing's swap-acceptance rule only ever improves total
    // crossings, so the order it runs on must always be the best-total
    // order, independent of which objective `--objective` asked to report
    // (§4.G's final paragraph).
    engine.tracker.restore_best(Objective::TotalCrossings, &mut engine.graph)?;
    let swaps = postprocess_swaps(&mut engine.graph, &mut engine.tracker);
    tracing::debug!(swaps, "post-processing swap pass complete");

    // §6.2: the output step restores whichever objective's best snapshot
    // `--objective` named — postprocessing may have just updated it, since
    // `postprocess_swaps` refreshes every tracker, not only total crossings.
    engine.tracker.restore_best(objective, &mut engine.graph)?;

    write_output(&engine.graph, &args)?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();
}

fn main() {
    let argv: Vec<String> = std::env::args().collect();
    let args = match parse_args(&argv) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    init_tracing(args.verbose);

    if let Err(err) = run(args, &argv) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
