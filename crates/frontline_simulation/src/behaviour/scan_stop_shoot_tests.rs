//! Tests for scan/stop/shoot behaviour.

#[cfg(test)]
mod tests {
    use super::super::scan_stop_shoot::{Phase, ScanStopShoot, ScanStopShootCapabilities};
    use crate::behaviour::Millis;
    use crate::error::ConfigError;

    const TICK: Millis = 16;
    const SCAN: Millis = 2000;
    const SHOOT: Millis = 2000;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Call {
        Scan,
        Stop,
        Move,
        Fire,
    }

    /// Fake юнит: пишет все capability-вызовы с временем тика
    struct FakeUnit {
        now: Millis,
        target: bool,
        speed: f32,
        velocity: f32,
        calls: Vec<(Millis, Call)>,
    }

    impl FakeUnit {
        fn new(speed: f32) -> Self {
            Self { now: 0, target: false, speed, velocity: 0.0, calls: Vec::new() }
        }

        fn times_of(&self, call: Call) -> Vec<Millis> {
            self.calls.iter().filter(|(_, c)| *c == call).map(|(t, _)| *t).collect()
        }
    }

    impl ScanStopShootCapabilities for FakeUnit {
        fn find_target(&mut self) -> bool {
            self.calls.push((self.now, Call::Scan));
            self.target
        }

        fn is_moving(&self) -> bool {
            self.velocity != 0.0
        }

        fn stop(&mut self) {
            self.calls.push((self.now, Call::Stop));
            self.velocity = 0.0;
        }

        fn move_forward(&mut self) {
            self.calls.push((self.now, Call::Move));
            self.velocity = self.speed;
        }

        fn create_bullet(&mut self) {
            self.calls.push((self.now, Call::Fire));
        }
    }

    /// Гоняет тики [from, to] с шагом TICK, `target_at` решает видимость цели
    fn run(
        behaviour: &mut ScanStopShoot,
        unit: &mut FakeUnit,
        from: Millis,
        to: Millis,
        target_at: impl Fn(Millis) -> bool,
    ) -> Vec<(Millis, Phase)> {
        let mut transitions = Vec::new();
        let mut now = from;
        while now <= to {
            unit.now = now;
            unit.target = target_at(now);
            if let Some(phase) = behaviour.update(now, unit) {
                transitions.push((now, phase));
            }
            now += TICK;
        }
        transitions
    }

    #[test]
    fn test_zero_intervals_rejected() {
        assert_eq!(ScanStopShoot::new(0, SHOOT), Err(ConfigError::ZeroInterval { name: "scan" }));
        assert_eq!(ScanStopShoot::new(SCAN, 0), Err(ConfigError::ZeroInterval { name: "shoot" }));
    }

    #[test]
    fn test_initial_phase_is_moving() {
        let behaviour = ScanStopShoot::new(SCAN, SHOOT).unwrap();
        assert_eq!(behaviour.phase(), Phase::Moving);
    }

    #[test]
    fn test_no_target_keeps_moving() {
        let mut behaviour = ScanStopShoot::new(SCAN, SHOOT).unwrap();
        let mut unit = FakeUnit::new(40.0);

        let transitions = run(&mut behaviour, &mut unit, 0, 10_000, |_| false);

        assert!(transitions.is_empty());
        assert_eq!(behaviour.phase(), Phase::Moving);
        assert_eq!(unit.velocity, 40.0);
        // move_forward только один раз: дальше guard по is_moving
        assert_eq!(unit.times_of(Call::Move), vec![0]);
        assert!(unit.times_of(Call::Fire).is_empty());
        assert!(unit.times_of(Call::Stop).is_empty());
    }

    #[test]
    fn test_scans_are_throttled() {
        let mut behaviour = ScanStopShoot::new(SCAN, SHOOT).unwrap();
        let mut unit = FakeUnit::new(40.0);

        run(&mut behaviour, &mut unit, 0, 10_000, |_| false);

        let scans = unit.times_of(Call::Scan);
        assert_eq!(scans, vec![0, 2000, 4000, 6000, 8000, 10_000]);
    }

    #[test]
    fn test_target_halts_unit_and_fires() {
        let mut behaviour = ScanStopShoot::new(SCAN, SHOOT).unwrap();
        let mut unit = FakeUnit::new(40.0);

        let transitions = run(&mut behaviour, &mut unit, 0, 12_000, |t| t >= 1000);

        let (stopped_at, phase) = transitions[0];
        assert_eq!(phase, Phase::Stopped);
        assert!(stopped_at >= 1000 && stopped_at <= 1000 + SCAN, "stopped at {}", stopped_at);
        assert_eq!(unit.velocity, 0.0);
        assert_eq!(unit.times_of(Call::Stop), vec![stopped_at]);

        let shots = unit.times_of(Call::Fire);
        assert!(!shots.is_empty());
        assert!(shots[0] >= stopped_at);
        for pair in shots.windows(2) {
            assert!(pair[1] - pair[0] >= SHOOT, "shots too close: {:?}", pair);
        }
    }

    #[test]
    fn test_continuous_target_fires_at_least_once_per_window() {
        let mut behaviour = ScanStopShoot::new(500, 300).unwrap();
        let mut unit = FakeUnit::new(25.0);

        run(&mut behaviour, &mut unit, 0, 3_000, |_| true);

        let shots = unit.times_of(Call::Fire);
        assert_eq!(shots[0], 0);
        // шаг тика 16 ms: 0, 304, 608, ... (первый тик >= предыдущий + 300)
        for pair in shots.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= 300 && gap < 300 + TICK, "gap {}", gap);
        }
    }

    #[test]
    fn test_target_lost_resumes_moving() {
        let mut behaviour = ScanStopShoot::new(SCAN, SHOOT).unwrap();
        let mut unit = FakeUnit::new(-40.0);

        let transitions = run(&mut behaviour, &mut unit, 0, 12_000, |t| t < 5000);

        assert_eq!(transitions[0], (0, Phase::Stopped));
        let (resumed_at, phase) = transitions[1];
        assert_eq!(phase, Phase::Moving);
        assert!(resumed_at >= 5000 && resumed_at <= 5000 + SCAN, "resumed at {}", resumed_at);
        assert_eq!(behaviour.phase(), Phase::Moving);
        assert_eq!(unit.velocity, -40.0);
        assert_eq!(*unit.times_of(Call::Move).last().unwrap(), resumed_at);

        // после ухода цели выстрелов нет
        assert!(unit.times_of(Call::Fire).iter().all(|t| *t < resumed_at));

        // shoot < scan: проверки на выстрел чаще сканов, цель уходит между сканами
        let mut behaviour = ScanStopShoot::new(SCAN, 300).unwrap();
        let mut unit = FakeUnit::new(40.0);

        let transitions = run(&mut behaviour, &mut unit, 0, 4_000, |t| t < 100);

        assert_eq!(transitions, vec![(0, Phase::Stopped), (2000, Phase::Moving)]);
        assert_eq!(unit.times_of(Call::Fire), vec![0]);
        // каждая проверка на выстрел спрашивает карту заново
        assert!(unit.times_of(Call::Scan).contains(&304));
        assert_eq!(*unit.times_of(Call::Move).last().unwrap(), 2000);
    }

    #[test]
    fn test_fire_requires_fresh_sighting() {
        let mut behaviour = ScanStopShoot::new(2000, 300).unwrap();
        let mut unit = FakeUnit::new(40.0);

        // цель видна на 0..100, пропадает, возвращается с 1000
        run(&mut behaviour, &mut unit, 0, 1990, |t| t < 100 || t >= 1000);

        assert_eq!(behaviour.phase(), Phase::Stopped);
        // проверки на 304, 608, 912 пустые, с 1216 цель снова видна
        assert_eq!(unit.times_of(Call::Fire), vec![0, 1216, 1520, 1824]);
        assert_eq!(unit.times_of(Call::Scan), vec![0, 304, 608, 912, 1216, 1520, 1824]);
    }

    #[test]
    fn test_flickering_target_does_not_thrash() {
        let mut behaviour = ScanStopShoot::new(SCAN, SHOOT).unwrap();
        let mut unit = FakeUnit::new(40.0);

        // цель мигает каждый тик
        let transitions = run(&mut behaviour, &mut unit, 0, 20_000, |t| (t / TICK) % 2 == 0);

        for pair in transitions.windows(2) {
            assert!(pair[1].0 - pair[0].0 >= SCAN, "transitions too close: {:?}", pair);
        }
    }

    #[test]
    fn test_external_stop_is_corrected_without_phase_change() {
        let mut behaviour = ScanStopShoot::new(SCAN, SHOOT).unwrap();
        let mut unit = FakeUnit::new(40.0);

        run(&mut behaviour, &mut unit, 0, 400, |_| false);
        assert_eq!(unit.times_of(Call::Move).len(), 1);

        // внешняя сила остановила юнит
        unit.velocity = 0.0;
        let transitions = run(&mut behaviour, &mut unit, 416, 800, |_| false);

        assert!(transitions.is_empty());
        assert_eq!(behaviour.phase(), Phase::Moving);
        assert_eq!(unit.times_of(Call::Move), vec![0, 416]);
        assert_eq!(unit.velocity, 40.0);
    }

    #[test]
    fn test_external_push_while_stopped_is_corrected() {
        let mut behaviour = ScanStopShoot::new(SCAN, SHOOT).unwrap();
        let mut unit = FakeUnit::new(40.0);

        run(&mut behaviour, &mut unit, 0, 400, |_| true);
        assert_eq!(behaviour.phase(), Phase::Stopped);

        unit.velocity = 12.0;
        run(&mut behaviour, &mut unit, 416, 416, |_| true);

        assert_eq!(behaviour.phase(), Phase::Stopped);
        assert_eq!(unit.velocity, 0.0);
        assert_eq!(*unit.times_of(Call::Stop).last().unwrap(), 416);
    }

    #[test]
    fn test_clock_going_backwards_does_not_fire() {
        let mut behaviour = ScanStopShoot::new(SCAN, SHOOT).unwrap();
        let mut unit = FakeUnit::new(40.0);

        unit.target = true;
        behaviour.update(5000, &mut unit);
        behaviour.update(1000, &mut unit);

        assert_eq!(unit.times_of(Call::Fire).len(), 1);
        assert_eq!(unit.times_of(Call::Scan).len(), 1);
    }
}
