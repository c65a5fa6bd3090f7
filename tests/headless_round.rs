use std::collections::BTreeMap;
use std::sync::mpsc;
use std::time::Duration;

use assert_matches::assert_matches;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::{rngs::StdRng, SeedableRng};

use wordmix::config::{ConfigEdit, MemoryConfigStore, SessionRecord, SettingsForm};
use wordmix::countdown::{CountdownEvent, ManualTicks};
use wordmix::ledger::Standing;
use wordmix::runtime::{command_for, ChannelEventSource, Command, GameEvent, Runner};
use wordmix::{Advance, Game, GameError, Phase, RevealPolicy, RoundError};

type TestGame = Game<MemoryConfigStore, StdRng, ManualTicks>;

fn record(phrases: &[&str], names: &[&str], duration: u32) -> SessionRecord {
    SessionRecord {
        phrases: phrases.iter().map(|p| p.to_string()).collect(),
        translations: Vec::new(),
        names: names.iter().map(|n| n.to_string()).collect(),
        duration,
        scores: BTreeMap::new(),
    }
}

fn game(record: SessionRecord) -> TestGame {
    Game::load(
        MemoryConfigStore::with_record(record),
        RevealPolicy::AfterExpiry,
        StdRng::seed_from_u64(7),
        ManualTicks::new(),
    )
    .unwrap()
}

fn key(c: char) -> GameEvent {
    GameEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

// Drives a single-phrase game through the runtime loop: the countdown runs
// out, the host reveals, scores a point and moves on to the final standings.
#[test]
fn headless_single_round_reaches_final_standings() {
    let mut game = game(record(&["Hello world."], &["Ann", "Bob"], 3));
    assert_eq!(game.machine().phase(), Phase::Scrambled);
    let tokens = game.machine().visible_tokens().unwrap().to_vec();
    assert_eq!(tokens.len(), 2);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(ChannelEventSource::new(rx), Duration::from_millis(5));

    // Revealing before time is up is refused
    tx.send(key('r')).unwrap();
    assert_matches!(runner.step(), GameEvent::Key(k) => {
        assert_eq!(command_for(k), Some(Command::Reveal));
        assert_matches!(
            game.reveal(),
            Err(GameError::Round(RoundError::RevealLocked))
        );
    });

    // Three one-second periods elapse on the fake clock
    let mut expired = false;
    for _ in 0..3 {
        game.machine_mut().countdown_mut().ticks_mut().advance(1);
        if let GameEvent::Tick = runner.step() {
            if game.poll() == Some(CountdownEvent::Expired) {
                expired = true;
            }
        }
    }
    assert!(expired);
    assert!(game.machine().can_reveal());
    assert_eq!(game.machine().remaining_secs(), 0);

    game.reveal().unwrap();
    assert_eq!(
        game.machine().visible_tokens().unwrap(),
        &["Hello".to_string(), "world.".to_string()]
    );

    game.apply_increment("Bob").unwrap();

    let advance = game.next().unwrap();
    assert_eq!(
        advance,
        Advance::Ended(vec![
            Standing {
                name: "Bob".into(),
                score: 1
            },
            Standing {
                name: "Ann".into(),
                score: 0
            },
        ])
    );
    assert_eq!(game.machine().phase(), Phase::Ended);

    let stored = game.store().stored().unwrap();
    assert_eq!(stored.scores.get("Bob"), Some(&1));
}

#[test]
fn headless_every_phrase_is_played_once() {
    let phrases = ["Un chat.", "Deux chiens!", "Trois oiseaux?", "Quatre poissons."];
    let mut game = game(record(&phrases, &[], 1));
    let mut seen = Vec::new();

    loop {
        let round = game.machine().round().unwrap();
        seen.push(round.phrase.clone());
        assert_eq!(game.tick(), Some(CountdownEvent::Expired));
        game.reveal().unwrap();
        match game.next().unwrap() {
            Advance::Started { .. } => continue,
            Advance::Ended(ranking) => {
                assert!(ranking.is_empty());
                break;
            }
        }
    }

    seen.sort();
    let mut expected: Vec<String> = phrases.iter().map(|p| p.to_string()).collect();
    expected.sort();
    assert_eq!(seen, expected);

    // Restart deals a fresh pass
    game.restart().unwrap();
    assert_eq!(game.machine().phase(), Phase::Scrambled);
    assert_eq!(game.machine().played_count(), 1);
}

#[test]
fn headless_settings_round_trip_restarts_game() {
    let mut game = game(record(&["Hello world."], &["Ann"], 30));
    game.apply_increment("Ann").unwrap();

    let form = SettingsForm {
        phrases: "Le ciel est bleu.\n\nIl pleut!".into(),
        translations: "The sky is blue.\nIt is raining!".into(),
        names: "Ann, , Chloé".into(),
        duration: "12".into(),
    };
    game.save_configuration(ConfigEdit::parse(&form).unwrap()).unwrap();

    assert_eq!(game.machine().phase(), Phase::Scrambled);
    assert_eq!(game.machine().total_phrases(), 2);
    assert_eq!(game.machine().duration_secs(), 12);
    assert_eq!(game.session().ledger.score("Ann"), Some(1));
    assert_eq!(game.session().ledger.score("Chloé"), Some(0));

    let stored = game.store().stored().unwrap();
    assert_eq!(stored.phrases, vec!["Le ciel est bleu.", "Il pleut!"]);
    assert_eq!(stored.names, vec!["Ann", "Chloé"]);
    assert_eq!(stored.duration, 12);
}

#[test]
fn headless_rejects_empty_phrase_list() {
    let mut game = game(record(&["Hello world."], &[], 30));
    let before = game.store().save_count();
    let form = SettingsForm {
        phrases: "\n\n".into(),
        translations: String::new(),
        names: String::new(),
        duration: "30".into(),
    };
    let err = ConfigEdit::parse(&form)
        .map_err(GameError::from)
        .and_then(|edit| game.save_configuration(edit));
    assert!(err.is_err());
    assert_eq!(game.store().save_count(), before);
    assert_eq!(game.machine().total_phrases(), 1);
}
