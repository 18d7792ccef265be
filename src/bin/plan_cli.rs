#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("plan_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use knee_plan_engine::geom::Point3;
    use knee_plan_engine::landmarks::Landmark;
    use knee_plan_engine::{ActionKind, Planner, PlannerConfig, RenderItem, SequencerState};

    const USAGE: &str = r#"plan_cli (knee-plan-engine)

USAGE:
  plan_cli landmarks
  plan_cli run [options]

OPTIONS (run):
  --valgus <deg>       Rotate the varus/valgus plane by <deg> (repeatable)
  --flexion <deg>      Rotate the flexion/extension plane by <deg> (repeatable)
  --offset <depth>     Set the resection depth before finishing
  --step <n>           Apply <n> resection steps (negative steps down)
  --stop-at <state>    Stop after reaching <state>, e.g. ValgusPlaneReady
  --hide-resection     Hide the distal resection plane at the end
  --quiet              Print only the final state and geometry
  -h, --help           Show this help
"#;

    /// Femur landmarks in scene units, femoral head up.
    const DEMO_LANDMARKS: [[f64; 3]; 10] = [
        [0.0, 0.0, 0.0],
        [0.05, 0.95, 0.02],
        [0.01, 0.55, 0.0],
        [0.0, 0.12, 0.01],
        [-0.42, 0.06, 0.08],
        [0.40, 0.05, 0.10],
        [-0.21, -0.06, 0.02],
        [0.19, -0.05, 0.03],
        [-0.22, 0.01, -0.28],
        [0.20, 0.00, -0.27],
    ];

    #[derive(Debug, Default)]
    struct RunOptions {
        valgus: Vec<f64>,
        flexion: Vec<f64>,
        offset: Option<f64>,
        steps: i32,
        stop_at: Option<SequencerState>,
        hide_resection: bool,
        quiet: bool,
    }

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "landmarks" => {
                print_landmarks();
                Ok(())
            }
            "run" => cmd_run(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_landmarks() {
        for (landmark, point) in Landmark::ALL.iter().zip(DEMO_LANDMARKS) {
            println!(
                "{:>2} {:<24} {}",
                landmark.index(),
                landmark.name(),
                format_point(point)
            );
        }
    }

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let mut options = RunOptions::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--valgus" => options.valgus.push(args.number("--valgus")?),
                "--flexion" => options.flexion.push(args.number("--flexion")?),
                "--offset" => options.offset = Some(args.number("--offset")?),
                "--step" => {
                    let raw = args.value("--step")?;
                    options.steps = raw
                        .parse()
                        .map_err(|_| format!("--step expects an integer, got `{raw}`"))?;
                }
                "--stop-at" => {
                    let raw = args.value("--stop-at")?;
                    options.stop_at = Some(raw.parse()?);
                }
                "--hide-resection" => options.hide_resection = true,
                "--quiet" => options.quiet = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let planner = run_scenario(&options).map_err(|err| err.to_string())?;
        print_summary(&planner);
        Ok(())
    }

    fn run_scenario(options: &RunOptions) -> knee_plan_engine::PlanResult<Planner> {
        let mut planner = Planner::with_config(PlannerConfig::default())?;
        for (index, point) in DEMO_LANDMARKS.into_iter().enumerate() {
            planner.set_landmark(index, Point3::from_array(point))?;
        }
        flush(&mut planner, options.quiet);

        let chain = [
            ActionKind::BuildAxes,
            ActionKind::CreateMechanicalPlane,
            ActionKind::ProjectTea,
            ActionKind::CreateAnteriorLine,
            ActionKind::CreateValgusPlane,
            ActionKind::CreateLateralLine,
            ActionKind::CreateFlexionPlane,
            ActionKind::CreateDistalMedialPlane,
            ActionKind::CreateDistalResectionPlane,
        ];

        for action in chain {
            let state = planner.perform(action)?;
            if action == ActionKind::CreateValgusPlane {
                for degrees in &options.valgus {
                    planner.rotate_valgus(*degrees)?;
                }
            }
            if action == ActionKind::CreateFlexionPlane {
                for degrees in &options.flexion {
                    planner.rotate_flexion(*degrees)?;
                }
            }
            flush(&mut planner, options.quiet);
            if options.stop_at == Some(state) {
                return Ok(planner);
            }
        }

        if let Some(offset) = options.offset {
            planner.set_resection(offset)?;
        }
        let step = planner.config().resection_step;
        for _ in 0..options.steps.unsigned_abs() {
            planner.adjust_resection(if options.steps < 0 { -step } else { step })?;
        }
        if options.hide_resection {
            planner.toggle_resection_visibility()?;
        }
        flush(&mut planner, options.quiet);

        Ok(planner)
    }

    fn flush(planner: &mut Planner, quiet: bool) {
        for message in planner.take_status() {
            if !quiet {
                println!("status: {message}");
            }
        }
    }

    fn print_summary(planner: &Planner) {
        println!();
        println!("state: {}", planner.current_state());
        println!("resection depth: {:.3}", planner.resection().distance());
        println!(
            "available: {}",
            planner
                .available_actions()
                .into_iter()
                .map(ActionKind::name)
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!();
        for item in planner.render_items() {
            println!("{}", describe(&item));
        }
    }

    fn describe(item: &RenderItem) -> String {
        match item {
            RenderItem::Point {
                name, coordinates, ..
            } => format!("point  {name:<28} {}", format_point(*coordinates)),
            RenderItem::Axis {
                name,
                start,
                end,
                ..
            }
            | RenderItem::Line {
                name,
                start,
                end,
                ..
            } => format!(
                "line   {name:<28} {} -> {}",
                format_point(*start),
                format_point(*end)
            ),
            RenderItem::Plane {
                name,
                center,
                normal,
                visible,
                ..
            } => format!(
                "plane  {name:<28} center {} normal {}{}",
                format_point(*center),
                format_point(*normal),
                if *visible { "" } else { " (hidden)" }
            ),
        }
    }

    fn format_point(p: [f64; 3]) -> String {
        format!("({:.4}, {:.4}, {:.4})", p[0], p[1], p[2])
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }

        fn number(&mut self, flag: &str) -> Result<f64, String> {
            let raw = self.value(flag)?;
            match raw.parse::<f64>() {
                Ok(value) if value.is_finite() => Ok(value),
                _ => Err(format!("{flag} expects a finite number, got `{raw}`")),
            }
        }
    }
}
