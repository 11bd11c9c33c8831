// Scan for a fixed literal with the Noodle matcher, block and streaming.

use litscan::{MatchOutcome, NoodTable, nood_exec, nood_exec_streaming};

fn main() {
    let table = NoodTable::build(b"ana", true, 7).expect("short literal");

    let mut cb = |end: usize, id: u32| {
        println!("match id {id} ending at {end}");
        MatchOutcome::Continue
    };

    println!("block scan of \"bAnana bandana\":");
    nood_exec(&table, b"bAnana bandana", 0, &mut cb);

    // In streaming mode, matches crossing the buffer boundary are stitched
    // through the history; offsets are relative to the current buffer.
    println!("streaming scan, history \"...ban\", current \"ana...\":");
    nood_exec_streaming(&table, b"...ban", b"ana...", &mut cb);
}
