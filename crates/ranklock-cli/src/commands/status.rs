//! One-shot status readout of the attached game.

use anyhow::Result;
use ranklock_core::{Config, GameState, MemoryReader, Player, ProcessHandle};

pub fn run(config: &Config) -> Result<()> {
    let process = ProcessHandle::find_and_open(&config.process_name, &config.module_name)?;
    let reader = MemoryReader::new(&process);

    let player = Player::new(&reader, process.base_address);
    let state = GameState::new(&reader, process.base_address);

    println!("Process:       {} (pid {})", config.process_name, process.pid);
    println!("Module base:   {:#x}", process.base_address);
    if let Some(version) = process.file_version()? {
        println!("Game version:  {version}");
    }
    println!("Rank:          {}", player.rank()?);
    println!("Points:        {}", player.points()?);
    println!("Dead:          {}", player.is_dead()?);
    println!("In abyss:      {}", player.is_in_abyss()?);
    println!("Gauntlet mode: {}", player.gauntlet_mode_enabled()?);
    println!("In session:    {}", state.in_session()?);

    Ok(())
}
