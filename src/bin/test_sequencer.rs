use syrinx::api::Song;
use syrinx::audio::PlaylistState;

fn song(id: i64, title: &str, artist: &str) -> Song {
    Song {
        id,
        title: title.to_string(),
        artist: artist.to_string(),
        duration_seconds: Some(200.0),
        filename: format!("{}.mp3", id),
        love_count: 0,
        is_loved: false,
    }
}

fn print_order(state: &PlaylistState) {
    let order: Vec<String> = state
        .items()
        .iter()
        .map(|s| s.display_title().to_string())
        .collect();
    println!("   Order: {:?}  current: {:?}", order, state.current_index());
}

fn main() {
    println!("🎵 Syrinx Sequencer Walkthrough");
    println!("===============================");

    let mut state = PlaylistState::new();
    state.load(vec![
        song(1, "First", "Someone"),
        song(2, "Second", "Someone"),
        song(3, "Third", "Someone Else"),
        song(4, "Fourth", "Nobody"),
    ]);
    println!("📜 Loaded {} songs", state.len());
    print_order(&state);

    println!("\n▶️  next / next / prev:");
    for _ in 0..2 {
        if let Some(s) = state.next() {
            println!("   -> {}", s.display_title());
        }
    }
    if let Some(s) = state.prev() {
        println!("   <- {}", s.display_title());
    }

    println!("\n🔀 Shuffle on (current song keeps its place):");
    state.toggle_shuffle();
    print_order(&state);

    println!("\n🔀 Shuffle off (server order comes back):");
    state.toggle_shuffle();
    print_order(&state);

    println!("\n❤️  Love song 2 twice (second one is a no-op):");
    println!("   changed: {}", state.set_love_state(2, true));
    println!("   changed: {}", state.set_love_state(2, true));
    let loved = state.items().iter().find(|s| s.id == 2).unwrap();
    println!("   song 2: loved={} count={}", loved.is_loved, loved.love_count);

    println!("\n✅ Sequencer walkthrough done!");
}
