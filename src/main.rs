use std::{
    fs,
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use anyhow::Context;
use chip::{
    chip8::ChipSet,
    definitions::cpu,
    opcode::{self, Operation},
    quirks::Quirks,
    resources::Rom,
    Runner,
};
use clap::{Parser, ValueEnum};

mod terminal;

use terminal::{Guard, TerminalDisplay, TerminalKeyboard};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QuirkSet {
    /// what most roms written today expect
    Modern,
    /// the original COSMAC VIP interpreter
    Cosmac,
    /// the HP48 super chip interpreter
    Schip,
}

impl From<QuirkSet> for Quirks {
    fn from(set: QuirkSet) -> Self {
        match set {
            QuirkSet::Modern => Quirks::modern(),
            QuirkSet::Cosmac => Quirks::cosmac(),
            QuirkSet::Schip => Quirks::schip(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "A CHIP-8 / SUPER-CHIP virtual machine for the terminal", long_about = None)]
struct Args {
    /// Path to the rom, the embedded splash rom runs if omitted
    rom: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = QuirkSet::Modern, help = "Interpreter behaviour to emulate")]
    quirks: QuirkSet,

    #[arg(short, long, default_value_t = cpu::CYCLES_PER_FRAME, help = "Instructions per frame")]
    cycles: usize,

    #[arg(short, long, default_value_t = 60, help = "Frames per second")]
    fps: u32,

    #[arg(long, help = "Seed for the random number generator")]
    seed: Option<u64>,

    #[arg(short, long, help = "Show the machine state below the screen")]
    debug: bool,

    #[arg(long, help = "Print the disassembly and the initial machine state, then exit")]
    dump: bool,
}

fn read_rom(path: &Path) -> anyhow::Result<Rom> {
    let data = fs::read(path).with_context(|| format!("Could not read the rom {}", path.display()))?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_uppercase())
        .unwrap_or_else(|| "ROM".to_string());
    Ok(Rom::new(&name, data))
}

fn dump(rom: &Rom, chip: &ChipSet) {
    println!("{} ({} bytes)", rom.get_name(), rom.get_data().len());
    for (address, code, instruction) in opcode::disassemble(rom.get_data(), cpu::PROGRAM_COUNTER) {
        match instruction {
            Some(instruction) => println!("{:#06X} : {:#06X}  {}", address, code, instruction),
            None => println!("{:#06X} : {:#06X}", address, code),
        }
    }
    println!("{}", chip);
}

fn run(chip: ChipSet, args: &Args) -> anyhow::Result<()> {
    let _guard = Guard::enter().context("Could not prepare the terminal")?;
    let mut runner = Runner::new(chip, TerminalDisplay::new(), TerminalKeyboard::new())
        .with_cycles(args.cycles);
    let frame_time = Duration::from_secs(1) / args.fps.max(1);
    let mut beeping = false;

    loop {
        let start = Instant::now();
        let status = runner.frame(start);

        if runner.keyboard().quit_requested() {
            break;
        }
        if status == Operation::Exit {
            log::info!("The program stopped the machine.");
            break;
        }

        let sound = runner.chip().is_sound_active();
        if sound && !beeping {
            runner.display_mut().beep()?;
        }
        beeping = sound;

        if args.debug {
            let snapshot = runner.chip().snapshot();
            let line = format!(
                "PC {:#06X}  I {:#06X}  SP {:>2}  DT {:>3}  ST {:>3}  {:<16} V {:02X?}",
                snapshot.program_counter,
                snapshot.index_register,
                snapshot.stack_pointer,
                snapshot.delay_timer,
                snapshot.sound_timer,
                snapshot.mnemonic(),
                snapshot.registers,
            );
            runner.display_mut().status(&line)?;
        }

        if let Some(rest) = frame_time.checked_sub(start.elapsed()) {
            thread::sleep(rest);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let rom = match &args.rom {
        Some(path) => read_rom(path)?,
        None => Rom::splash(),
    };

    let mut chip = ChipSet::with_quirks(args.quirks.into());
    if let Some(seed) = args.seed {
        chip = chip.with_seed(seed);
    }
    chip.load_rom(rom.clone())
        .with_context(|| format!("Could not load the rom {}", rom.get_name()))?;

    if args.dump {
        dump(&rom, &chip);
        return Ok(());
    }
    run(chip, &args)
}
