/// Preview — compile a prompt and inspect or simulate the result.
///
/// Usage: preview [--seed <n>] [--frames <n>] [--json] <prompt words...>
///
///   --seed <n>    — pin the seed instead of hashing the prompt
///   --frames <n>  — run the engine headless for n frames and print
///                   the final state
///   --json        — print the full description as JSON

use arcade_forge::core::pipeline::{compile, CompileOptions};
use arcade_forge::runtime::{Engine, InputEvent};
use arcade_forge::schema::entity::Vec2;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let mut seed: Option<u32> = None;
    let mut frames: usize = 0;
    let mut as_json = false;
    let mut prompt_words: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().ok();
            }
            "--frames" if i + 1 < args.len() => {
                i += 1;
                frames = args[i].parse().unwrap_or(0);
            }
            "--json" => as_json = true,
            word => prompt_words.push(word.to_string()),
        }
        i += 1;
    }

    let prompt = prompt_words.join(" ");
    let options = CompileOptions {
        seed,
        ..Default::default()
    };
    let out = compile(&prompt, &options);

    if as_json {
        match out.description.to_json() {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("serialization failed: {}", err);
                std::process::exit(1);
            }
        }
        return;
    }

    println!("{}  [{}]", out.description.title, out.debug_label);
    println!("  category: {:?}", out.description.category);
    println!("  controls: {:?}", out.description.controls.scheme);
    println!("  entities: {}", out.description.entities.len());
    println!("  rules:    {}", out.description.rules.len());
    if !out.intent.theme_tags.is_empty() {
        println!("  themes:   {}", out.intent.theme_tags.join(", "));
    }

    if frames > 0 {
        let world = out.description.world.size;
        let mut engine = Engine::new(out.description);
        engine.start();
        // Nudge the game so something happens on every scheme.
        engine.handle_input(InputEvent::PointerDown(Vec2::new(
            world.x * 0.5,
            world.y * 0.5,
        )));
        for _ in 0..frames {
            engine.step(1.0 / 60.0);
        }
        let state = engine.get_state();
        println!(
            "after {} frames: {:?}, score {}, {} entities",
            frames,
            state.status,
            state.score,
            engine.render_frame().entities.len()
        );
    }
}

fn print_usage() {
    eprintln!("Usage: preview [--seed <n>] [--frames <n>] [--json] <prompt words...>");
}
