use std::cell::RefCell;
use std::rc::Rc;

use game_core::{
    DifficultyTier, LinePaths, NetId, Outcome, Owner, Params, PathFollower, Skin,
};
use proto::GameEvent;

use crate::registry::RegisteredKind;
use crate::session::{Environment, Leaderboard, PeerLink, Phase, Session, SessionConfig};
use crate::SessionError;

type Outbox = Rc<RefCell<Vec<Vec<u8>>>>;

struct MockLink {
    outbox: Outbox,
}

impl PeerLink for MockLink {
    fn send_bytes(&self, bytes: &[u8]) -> Result<(), SessionError> {
        self.outbox.borrow_mut().push(bytes.to_vec());
        Ok(())
    }
}

struct MockEnv;

impl Environment for MockEnv {
    fn now(&self) -> u64 {
        0
    }
    fn log(&self, _msg: String) {
        // No-op for tests
    }
}

struct MockLeaderboard {
    submitted: Rc<RefCell<Vec<i32>>>,
}

impl Leaderboard for MockLeaderboard {
    fn submit_score(&self, score: i32) {
        self.submitted.borrow_mut().push(score);
    }
}

struct Peer {
    session: Session,
    outbox: Outbox,
    submitted: Rc<RefCell<Vec<i32>>>,
}

fn make_peer(config: SessionConfig) -> Peer {
    let outbox: Outbox = Rc::new(RefCell::new(Vec::new()));
    let submitted = Rc::new(RefCell::new(Vec::new()));
    let session = Session::new(
        config,
        Box::new(MockEnv),
        Box::new(MockLink {
            outbox: outbox.clone(),
        }),
        Box::new(LinePaths::new(10.0)),
        Box::new(MockLeaderboard {
            submitted: submitted.clone(),
        }),
    );
    Peer {
        session,
        outbox,
        submitted,
    }
}

fn drain(outbox: &Outbox) -> Vec<GameEvent> {
    outbox
        .borrow_mut()
        .drain(..)
        .map(|bytes| GameEvent::from_bytes(&bytes).unwrap())
        .collect()
}

/// Deliver every queued broadcast to both peers in order, looping until
/// the network is quiet. The transport echoes events to the sender too.
fn pump(a: &mut Peer, b: &mut Peer) -> Vec<GameEvent> {
    let mut delivered = Vec::new();
    loop {
        let mut batch = drain(&a.outbox);
        batch.extend(drain(&b.outbox));
        if batch.is_empty() {
            break delivered;
        }
        for event in batch {
            a.session.on_receive(event.clone());
            b.session.on_receive(event.clone());
            delivered.push(event);
        }
    }
}

fn pump_solo(peer: &mut Peer) -> Vec<GameEvent> {
    let mut delivered = Vec::new();
    loop {
        let batch = drain(&peer.outbox);
        if batch.is_empty() {
            break delivered;
        }
        for event in batch {
            peer.session.on_receive(event.clone());
            delivered.push(event);
        }
    }
}

fn join_lobby() -> (Peer, Peer) {
    let mut host = make_peer(SessionConfig::shared(DifficultyTier::Medium, 11, true));
    let mut guest = make_peer(SessionConfig::shared(DifficultyTier::Medium, 22, false));
    for peer in [&mut host, &mut guest] {
        peer.session.player_joined().unwrap();
        peer.session.player_joined().unwrap();
    }
    pump(&mut host, &mut guest);
    (host, guest)
}

fn start_playing() -> (Peer, Peer) {
    let (mut host, mut guest) = join_lobby();
    host.session.grab_basket();
    guest.session.grab_basket();
    pump(&mut host, &mut guest);
    for _ in 0..6 {
        host.session.tick(1.0);
        guest.session.tick(1.0);
        pump(&mut host, &mut guest);
    }
    assert_eq!(host.session.phase(), Phase::Playing);
    assert_eq!(guest.session.phase(), Phase::Playing);
    (host, guest)
}

#[test]
fn test_roles_follow_join_order() {
    let (host, guest) = join_lobby();
    assert!(host.session.role().is_authority());
    assert!(!guest.session.role().is_authority());
    assert_eq!(host.session.local_slot(), 0);
    assert_eq!(guest.session.local_slot(), 1);
}

#[test]
fn test_room_rejects_a_third_join() {
    let (mut host, _guest) = join_lobby();
    assert_eq!(
        host.session.player_joined(),
        Err(SessionError::RoomUnavailable)
    );
}

#[test]
fn test_countdown_runs_once_and_starts_play() {
    let (mut host, mut guest) = join_lobby();
    host.session.grab_basket();
    guest.session.grab_basket();
    pump(&mut host, &mut guest);

    host.session.tick(0.1);
    guest.session.tick(0.1);
    let mut delivered = pump(&mut host, &mut guest);
    assert_eq!(host.session.phase(), Phase::Countdown);
    assert_eq!(guest.session.phase(), Phase::Countdown);
    assert_eq!(guest.session.countdown(0), Some(3));
    assert_eq!(guest.session.countdown(1), Some(3));

    for _ in 0..5 {
        host.session.tick(1.0);
        guest.session.tick(1.0);
        delivered.extend(pump(&mut host, &mut guest));
    }

    let ticks: Vec<_> = delivered
        .iter()
        .filter_map(|event| match event {
            GameEvent::Countdown {
                slot: 0,
                value,
                visible,
            } => Some((*value, *visible)),
            _ => None,
        })
        .collect();
    assert_eq!(
        ticks,
        vec![(3, true), (2, true), (1, true), (0, true), (0, false)]
    );

    let starts = delivered
        .iter()
        .filter(|event| matches!(event, GameEvent::StartPlaying))
        .count();
    assert_eq!(starts, 1, "StartPlaying must be broadcast exactly once");
    assert_eq!(host.session.phase(), Phase::Playing);
    assert_eq!(guest.session.phase(), Phase::Playing);
    assert_eq!(host.session.countdown(0), None, "display hidden after zero");

    // A stray extra ready event must not restart the countdown
    host.session.on_receive(GameEvent::PlayerGrabbed { slot: 0 });
    host.session.tick(1.0);
    guest.session.tick(1.0);
    let extra = pump(&mut host, &mut guest);
    assert!(
        !extra
            .iter()
            .any(|event| matches!(event, GameEvent::Countdown { .. })),
        "countdown must not re-arm"
    );
}

#[test]
fn test_untargeted_spawns_land_on_own_lanes() {
    let (mut host, mut guest) = start_playing();
    let id = NetId::new(0, 777);
    let event = GameEvent::SpawnWave {
        id: id.0,
        kind: 0,
        lane: 1,
        speed: 3.0,
        target: None,
    };
    host.session.on_receive(event.clone());
    guest.session.on_receive(event);

    let entity = host.session.entity(id).unwrap();
    let follower = host.session.world().get::<&PathFollower>(entity).unwrap();
    let owner = host.session.world().get::<&Owner>(entity).unwrap();
    assert_eq!(follower.path.side, 0, "authority keeps its own lane set");
    assert_eq!(owner.0, 0);
    drop(follower);
    drop(owner);

    let entity = guest.session.entity(id).unwrap();
    let follower = guest.session.world().get::<&PathFollower>(entity).unwrap();
    let owner = guest.session.world().get::<&Owner>(entity).unwrap();
    assert_eq!(follower.path.side, 1, "follower uses the mirrored set");
    assert_eq!(owner.0, 1);
}

#[test]
fn test_targeted_hazard_lands_on_target_lanes_everywhere() {
    let (mut host, mut guest) = start_playing();
    host.session.send_deterrent().unwrap();
    let delivered = pump(&mut host, &mut guest);

    let id = delivered
        .iter()
        .find_map(|event| match event {
            GameEvent::SpawnWave {
                id,
                target: Some(target),
                ..
            } => {
                assert_eq!(*target, 1, "host sends at the guest");
                Some(NetId(*id))
            }
            _ => None,
        })
        .expect("deterrent should broadcast a targeted wave");

    for peer in [&host, &guest] {
        let entity = peer.session.entity(id).unwrap();
        let follower = peer.session.world().get::<&PathFollower>(entity).unwrap();
        let owner = peer.session.world().get::<&Owner>(entity).unwrap();
        assert_eq!(follower.path.side, 1, "routed at the target on every peer");
        assert_eq!(owner.0, 1);
    }

    // The targeted peer announced the repaint and both peers applied it
    assert!(delivered
        .iter()
        .any(|event| matches!(event, GameEvent::MarkHazard { .. })));
    for peer in [&host, &guest] {
        let entity = peer.session.entity(id).unwrap();
        let skin = peer.session.world().get::<&Skin>(entity).unwrap();
        assert_eq!(*skin, Skin::MarkedHazard);
    }

    assert_eq!(
        host.session.slots()[0].deterrents_available,
        Params::STARTING_DETERRENTS - 1
    );
}

#[test]
fn test_send_deterrent_guards() {
    let mut solo = make_peer(SessionConfig::single_player(DifficultyTier::Easy, 3));
    solo.session.player_joined().unwrap();
    assert_eq!(
        solo.session.send_deterrent(),
        Err(SessionError::NotMultiplayer)
    );

    let (mut host, _guest) = join_lobby();
    assert_eq!(host.session.send_deterrent(), Err(SessionError::WrongPhase));

    let (mut host2, mut guest2) = start_playing();
    for _ in 0..Params::STARTING_DETERRENTS {
        host2.session.send_deterrent().unwrap();
        pump(&mut host2, &mut guest2);
    }
    assert_eq!(
        host2.session.send_deterrent(),
        Err(SessionError::OutOfDeterrents)
    );
}

#[test]
fn test_duplicate_spawn_delivery_creates_one_entity() {
    let (mut host, _guest) = start_playing();
    let before = host.session.world().len();
    let event = GameEvent::SpawnWave {
        id: NetId::new(1, 3).0,
        kind: 1,
        lane: 2,
        speed: 4.0,
        target: None,
    };
    host.session.on_receive(event.clone());
    host.session.on_receive(event);
    assert_eq!(host.session.world().len(), before + 1);
}

#[test]
fn test_late_spawn_after_game_over_is_dropped() {
    let (mut host, mut guest) = start_playing();
    host.session.on_receive(GameEvent::SpawnWave {
        id: NetId::new(0, 100).0,
        kind: 0,
        lane: 1,
        speed: 3.0,
        target: None,
    });
    assert_eq!(host.session.world().len(), 1);
    host.session.report_game_over().unwrap();
    pump(&mut host, &mut guest);
    assert_eq!(host.session.phase(), Phase::GameOver);
    assert_eq!(guest.session.phase(), Phase::GameOver);
    assert_eq!(host.session.world().len(), 0, "entities released at game over");

    let id = NetId::new(0, 555);
    host.session.on_receive(GameEvent::SpawnWave {
        id: id.0,
        kind: 0,
        lane: 0,
        speed: 3.0,
        target: None,
    });
    assert!(host.session.entity(id).is_none());
    assert_eq!(host.session.world().len(), 0);
}

#[test]
fn test_mark_for_unknown_entity_is_ignored() {
    let (mut host, _guest) = start_playing();
    // Must not panic, and must not conjure an entity
    host.session.on_receive(GameEvent::MarkHazard { id: 424242 });
    assert!(host.session.entity(NetId(424242)).is_none());
}

#[test]
fn test_entity_id_registration_is_replay_safe() {
    let (mut host, mut guest) = join_lobby();
    host.session
        .register_entity(RegisteredKind::Basket, 0, NetId::new(0, 9));
    pump(&mut host, &mut guest);
    assert_eq!(
        guest.session.ids().get(RegisteredKind::Basket, 0),
        Some(NetId::new(0, 9))
    );

    let replay = GameEvent::RegisterEntity {
        kind: 1,
        slot: 0,
        id: NetId::new(0, 9).0,
    };
    guest.session.on_receive(replay.clone());
    guest.session.on_receive(replay);
    assert_eq!(
        guest.session.ids().get(RegisteredKind::Basket, 0),
        Some(NetId::new(0, 9))
    );

    // Last writer wins
    guest.session.on_receive(GameEvent::RegisterEntity {
        kind: 1,
        slot: 0,
        id: NetId::new(0, 10).0,
    });
    assert_eq!(
        guest.session.ids().get(RegisteredKind::Basket, 0),
        Some(NetId::new(0, 10))
    );
}

#[test]
fn test_follower_never_originates_spawns() {
    let (mut host, mut guest) = start_playing();
    drain(&host.outbox);
    drain(&guest.outbox);

    guest.session.tick(5.0);
    assert!(drain(&guest.outbox).is_empty(), "follower must stay silent");

    host.session.tick(5.0);
    assert!(
        !drain(&host.outbox).is_empty(),
        "authority emits wave decisions"
    );
}

#[test]
fn test_follower_cannot_report_game_over() {
    let (_host, mut guest) = start_playing();
    assert_eq!(
        guest.session.report_game_over(),
        Err(SessionError::NotAuthority)
    );
}

#[test]
fn test_followers_track_the_authority_speed() {
    let (mut host, mut guest) = start_playing();
    let event = GameEvent::SpawnWave {
        id: NetId::new(0, 900).0,
        kind: 0,
        lane: 0,
        speed: 6.5,
        target: None,
    };
    host.session.on_receive(event.clone());
    guest.session.on_receive(event);
    assert_eq!(guest.session.current_speed(), 6.5);
    assert_eq!(host.session.current_speed(), 6.5);
}

#[test]
fn test_solo_game_over_submits_score_once() {
    let mut peer = make_peer(SessionConfig::single_player(DifficultyTier::Easy, 5));
    peer.session.player_joined().unwrap();
    peer.session.grab_basket();
    pump_solo(&mut peer);
    for _ in 0..6 {
        peer.session.tick(1.0);
        pump_solo(&mut peer);
    }
    assert_eq!(peer.session.phase(), Phase::Playing);

    peer.session.slots_mut()[0].score = 21;
    peer.session.report_game_over().unwrap();
    pump_solo(&mut peer);

    assert_eq!(peer.session.outcome(), Some(Outcome::SoloScore(21)));
    assert_eq!(*peer.submitted.borrow(), vec![21]);

    // A duplicate game-over delivery must not resubmit
    peer.session.on_receive(GameEvent::GameOver);
    assert_eq!(*peer.submitted.borrow(), vec![21]);
}

#[test]
fn test_health_tie_breaks_on_score() {
    let (mut host, mut guest) = start_playing();
    for peer in [&mut host, &mut guest] {
        let slots = peer.session.slots_mut();
        slots[0].health = 5;
        slots[1].health = 5;
        slots[0].score = 10;
        slots[1].score = 12;
    }
    host.session.report_game_over().unwrap();
    pump(&mut host, &mut guest);
    assert_eq!(host.session.outcome(), Some(Outcome::Lose));
    assert_eq!(guest.session.outcome(), Some(Outcome::Win));
}

#[test]
fn test_departed_opponent_resolves_as_win() {
    let (mut host, mut guest) = start_playing();
    host.session.player_left();
    {
        let slots = host.session.slots_mut();
        slots[0].health = 1;
        slots[1].health = 5;
    }
    host.session.report_game_over().unwrap();
    pump(&mut host, &mut guest);
    assert_eq!(host.session.outcome(), Some(Outcome::Win));
}

#[test]
fn test_multiplayer_session_never_touches_the_leaderboard() {
    let (mut host, mut guest) = start_playing();
    host.session.report_game_over().unwrap();
    pump(&mut host, &mut guest);
    assert!(host.submitted.borrow().is_empty());
    assert!(guest.submitted.borrow().is_empty());
}
