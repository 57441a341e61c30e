//! Contains the [RawDataChecker].

use crate::config::crate_params::{self, MAX_BOARDS_IN_CRATE};
use crate::stats::report;
use crate::util::*;
use std::fmt::Write;

/// The end of run is announced this many bunch crossings before the EOX answer.
const EOX_DELAY_BC: i64 = 3;

/// Boards of one crate answering to the same trigger in the same bunch crossing.
#[derive(Debug, Default)]
struct CrateEvent {
    regs: Vec<RoBoard>,
    locs: Vec<RoBoard>,
}

/// Checks the consistency of decoded board words, event by event.
///
/// The masks of the local boards and the busy flags are kept between calls to [RawDataChecker::process].
#[derive(Debug)]
pub struct RawDataChecker {
    crate_masks: CrateMasks,
    busy_policy: BusyPolicy,
    masks: HashMap<u8, RoBoard>,
    busy_locs: HashMap<u8, bool>,
    busy_regs: HashMap<u8, bool>,
    n_processed: u32,
    n_faulty: u32,
    debug_msg: String,
    stats_sender: Option<flume::Sender<StatType>>,
}

impl RawDataChecker {
    /// Creates a checker expecting answers to triggers from the boards that are active in `crate_masks`.
    pub fn new(crate_masks: CrateMasks, config: &impl CheckOpt) -> Self {
        Self {
            crate_masks,
            busy_policy: config.busy_policy(),
            masks: HashMap::new(),
            busy_locs: HashMap::new(),
            busy_regs: HashMap::new(),
            n_processed: 0,
            n_faulty: 0,
            debug_msg: String::new(),
            stats_sender: None,
        }
    }

    /// Reports statistics and inconsistencies through `sender`.
    pub fn with_stats(mut self, sender: flume::Sender<StatType>) -> Self {
        self.stats_sender = Some(sender);
        self
    }

    /// Checks the boards, `rofs` index into `boards`. Returns true if no inconsistency was found.
    ///
    /// The description of the inconsistencies is available with [RawDataChecker::debug_msg] until the next call.
    pub fn process(&mut self, boards: &[RoBoard], rofs: &[RofRecord]) -> bool {
        self.debug_msg.clear();
        let (n_processed, n_faulty) = (self.n_processed, self.n_faulty);

        let mut events: BTreeMap<u64, Vec<&RofRecord>> = BTreeMap::new();
        let mut eox_ir: Option<InteractionRecord> = None;
        for rof in rofs {
            events.entry(rof.ir.to_long()).or_default().push(rof);
            for board in &boards[rof.range()] {
                if board.trigger_word & (raw_info::SOX | raw_info::EOX) == 0 {
                    continue;
                }
                eox_ir = if board.trigger_word & raw_info::EOX != 0 {
                    Some(rof.ir - EOX_DELAY_BC)
                } else {
                    None
                };
                if board.is_local() {
                    let _ = self.masks.entry(board.board_id).or_insert(*board);
                }
            }
        }

        let mut is_ok = true;
        for (ir_long, event_rofs) in &events {
            let ir = InteractionRecord::from_long(*ir_long);
            // A local clock beyond the orbit length gives a meaningless time, it cannot be compared to the end of run
            let is_affected_by_eox =
                ir.bc <= LHC_MAX_BUNCHES && eox_ir.is_some_and(|eox| *ir_long >= eox.to_long());

            let mut crate_events: BTreeMap<u16, CrateEvent> = BTreeMap::new();
            for board in event_rofs.iter().flat_map(|rof| &boards[rof.range()]) {
                let key = u16::from(board.trigger_word) << 8 | u16::from(board.crate_id());
                let is_busy = board.status_word & raw_info::LOCALBUSY != 0;
                let crate_event = crate_events.entry(key).or_default();
                if board.is_local() {
                    crate_event.locs.push(*board);
                    let _ = self.busy_locs.insert(board.board_id, is_busy);
                } else {
                    crate_event.regs.push(*board);
                    let _ = self.busy_regs.insert(board.board_id, is_busy);
                }
            }

            for (key, crate_event) in &crate_events {
                self.n_processed += 1;
                if let Err(msg) = self.check_event((key & 0xFF) as u8, crate_event, is_affected_by_eox) {
                    is_ok = false;
                    self.n_faulty += 1;
                    let _ = writeln!(self.debug_msg, "{ir}: {msg}");
                    report(self.stats_sender.as_ref(), StatType::Error(format!("{ir}: {msg}").into()));
                }
            }
        }

        report(
            self.stats_sender.as_ref(),
            StatType::EventsChecked {
                processed: self.n_processed - n_processed,
                faulty: self.n_faulty - n_faulty,
            },
        );
        is_ok
    }

    fn check_event(&self, crate_id: u8, event: &CrateEvent, is_affected_by_eox: bool) -> Result<(), String> {
        if !is_affected_by_eox {
            self.check_reg_loc_consistency(crate_id, event)?;
        }
        event.locs.iter().try_for_each(check_local_board_size)?;
        event
            .regs
            .iter()
            .chain(&event.locs)
            .try_for_each(check_trigger_consistency)?;
        event.locs.iter().try_for_each(|loc| self.check_mask(loc))
    }

    fn check_reg_loc_consistency(&self, crate_id: u8, event: &CrateEvent) -> Result<(), String> {
        let expected: usize = event
            .regs
            .iter()
            .map(|reg| {
                if reg.trigger_word == 0 {
                    // Self-triggered: the regional board tells which local boards answered
                    reg.fired_chambers.count_ones() as usize
                } else {
                    // Triggered: all active local boards of its half GBT answer
                    let reg_nibble = crate_params::loc_id(reg.board_id);
                    let fee_id = crate_params::make_fee_id(reg.crate_id(), reg_nibble / 8);
                    let reg_in_gbt = usize::from(reg_nibble % 2);
                    (0..4)
                        .filter(|iboard| self.crate_masks.is_active(iboard + 4 * reg_in_gbt, fee_id))
                        .count()
                }
            })
            .sum();
        if event.locs.len() == expected {
            return Ok(());
        }
        if self.busy_policy == BusyPolicy::TolerateMismatch && self.is_busy(crate_id) {
            log::debug!(
                "Crate {crate_id}: {} local boards instead of {expected}, tolerated since a busy flag is raised",
                event.locs.len()
            );
            return Ok(());
        }
        let mut msg = format!(
            "loc-reg inconsistency: fired locals ({}) != expected from reg ({expected})\n",
            event.locs.len()
        );
        for board in event.regs.iter().chain(&event.locs) {
            let _ = writeln!(msg, "  {board}");
        }
        Err(msg)
    }

    fn is_busy(&self, crate_id: u8) -> bool {
        (0..MAX_BOARDS_IN_CRATE as u8)
            .map(|iboard| crate_params::make_unique_loc_id(crate_id, iboard))
            .any(|board_id| {
                self.busy_locs.get(&board_id).copied().unwrap_or_default()
                    || self.busy_regs.get(&board_id).copied().unwrap_or_default()
            })
    }

    // In overwritten mode the board reports its mask instead of the patterns
    fn check_mask(&self, loc: &RoBoard) -> Result<(), String> {
        if loc.status_word & raw_info::OVERWRITTEN == 0 {
            return Ok(());
        }
        let (mask_bp, mask_nbp) = self
            .masks
            .get(&loc.board_id)
            .map_or(([0; 4], [0; 4]), |mask| (mask.patterns_bp, mask.patterns_nbp));
        if mask_bp != loc.patterns_bp || mask_nbp != loc.patterns_nbp {
            return Err(format!("pattern is not compatible with mask for:\n  {loc}\n"));
        }
        Ok(())
    }

    /// Description of the inconsistencies found in the last call to [RawDataChecker::process].
    #[inline]
    pub fn debug_msg(&self) -> &str {
        &self.debug_msg
    }

    /// Number of events checked since the last reset.
    #[inline]
    pub fn n_events_processed(&self) -> u32 {
        self.n_processed
    }

    /// Number of events with an inconsistency since the last reset.
    #[inline]
    pub fn n_events_faulty(&self) -> u32 {
        self.n_faulty
    }

    /// Clears the masks, the busy flags and the statistics.
    pub fn reset(&mut self) {
        self.masks.clear();
        self.busy_locs.clear();
        self.busy_regs.clear();
        self.n_processed = 0;
        self.n_faulty = 0;
        self.debug_msg.clear();
    }
}

// Only meaningful for self-triggered events, where each fired chamber sends its patterns
fn check_local_board_size(loc: &RoBoard) -> Result<(), String> {
    if loc.trigger_word != 0 {
        return Ok(());
    }
    for ich in 0..4 {
        let is_null = loc.patterns_bp[ich] == 0 && loc.patterns_nbp[ich] == 0;
        if loc.is_fired(ich) == is_null {
            return Err(format!("wrong size for local board:\n  {loc}\n"));
        }
    }
    Ok(())
}

fn check_trigger_consistency(board: &RoBoard) -> Result<(), String> {
    let is_sox_or_reset = board.trigger_word & (raw_info::SOX | raw_info::EOX | raw_info::RESET) != 0;
    let is_calib = raw_info::is_calibration(board.trigger_word);
    let is_phys = board.trigger_word & raw_info::PHY != 0;

    if is_phys {
        if is_calib {
            return Err(format!(
                "inconsistent trigger: calibration and physics trigger cannot be fired together\n  {board}\n"
            ));
        }
        if board.is_local() && board.fired_chambers != 0 {
            return Err(format!("inconsistent trigger: fired chambers should be 0\n  {board}\n"));
        }
    }
    if is_sox_or_reset && (is_calib || is_phys) {
        return Err(format!(
            "inconsistent trigger: cannot be SOX and calibration or physics\n  {board}\n"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_util::MockConfig;
    use pretty_assertions::assert_eq;

    const LOC: u8 = raw_info::STARTBIT | raw_info::CARDTYPE;
    const REG: u8 = raw_info::STARTBIT;

    fn event(boards: &[RoBoard], ir: InteractionRecord) -> Vec<RofRecord> {
        (0..boards.len())
            .map(|i| RofRecord::new(ir, EventType::Standard, i, 1))
            .collect()
    }

    // Regional board 0 of crate 0 answering to a physics trigger, followed by `n_locs` of its local boards
    fn phys_event(n_locs: u8, loc_status: u8) -> Vec<RoBoard> {
        let mut boards = vec![RoBoard::new(REG, raw_info::PHY, 0x00, 0xF)];
        boards.extend((0..n_locs).map(|iloc| RoBoard::new(LOC | loc_status, raw_info::PHY, iloc, 0)));
        boards
    }

    #[test]
    fn test_consistent_physics_event() {
        let mut checker = RawDataChecker::new(CrateMasks::all_active(), &MockConfig::new());
        let boards = phys_event(4, 0);
        assert!(checker.process(&boards, &event(&boards, InteractionRecord::new(10, 1))));
        assert_eq!(checker.n_events_processed(), 1);
        assert_eq!(checker.n_events_faulty(), 0);
        assert!(checker.debug_msg().is_empty());
    }

    #[test]
    fn test_missing_local_board() {
        let (send, recv) = flume::unbounded();
        let mut checker = RawDataChecker::new(CrateMasks::all_active(), &MockConfig::new()).with_stats(send);
        let boards = phys_event(3, 0);
        assert!(!checker.process(&boards, &event(&boards, InteractionRecord::new(10, 1))));
        assert_eq!(checker.n_events_faulty(), 1);
        assert!(checker
            .debug_msg()
            .contains("fired locals (3) != expected from reg (4)"));
        let stats: Vec<StatType> = recv.drain().collect();
        assert_eq!(
            stats.last(),
            Some(&StatType::EventsChecked {
                processed: 1,
                faulty: 1
            })
        );
    }

    #[test]
    fn test_busy_flag_policy() {
        let boards = phys_event(3, raw_info::LOCALBUSY);
        let rofs = event(&boards, InteractionRecord::new(10, 1));

        let mut tolerant = RawDataChecker::new(CrateMasks::all_active(), &MockConfig::new());
        assert!(tolerant.process(&boards, &rofs));

        let strict_config = MockConfig {
            busy_policy: BusyPolicy::Report,
            ..Default::default()
        };
        let mut strict = RawDataChecker::new(CrateMasks::all_active(), &strict_config);
        assert!(!strict.process(&boards, &rofs));
    }

    #[test]
    fn test_inactive_boards_are_not_expected() {
        let mut masks = CrateMasks::all_active();
        masks.set_active_boards(0, 0xF7);
        let mut checker = RawDataChecker::new(masks, &MockConfig::new());
        let boards = phys_event(3, 0);
        assert!(checker.process(&boards, &event(&boards, InteractionRecord::new(10, 1))));
    }

    #[test]
    fn test_self_triggered_event() {
        let mut checker = RawDataChecker::new(CrateMasks::all_active(), &MockConfig::new());
        let mut loc = RoBoard::new(LOC, 0, 0x02, 0x1);
        loc.patterns_bp[0] = 0x10;
        let boards = [RoBoard::new(REG, 0, 0x00, 0x4), loc];
        assert!(checker.process(&boards, &event(&boards, InteractionRecord::new(5, 1))));

        // Fired bit of a chamber without patterns
        loc.fired_chambers = 0x3;
        let boards = [RoBoard::new(REG, 0, 0x00, 0x4), loc];
        assert!(!checker.process(&boards, &event(&boards, InteractionRecord::new(5, 1))));
        assert!(checker.debug_msg().contains("wrong size"));
        assert_eq!(checker.n_events_processed(), 2);
    }

    #[test]
    fn test_self_triggered_regional_expects_its_fired_locals() {
        let mut checker = RawDataChecker::new(CrateMasks::all_active(), &MockConfig::new());
        let mut loc = RoBoard::new(LOC, 0, 0x00, 0x1);
        loc.patterns_bp[0] = 0x8000;
        // The regional board reports two fired local boards, only one answers
        let boards = [RoBoard::new(REG, 0, 0x00, 0x3), loc];
        assert!(!checker.process(&boards, &event(&boards, InteractionRecord::new(20, 1))));
        assert_eq!(checker.n_events_faulty(), 1);
        assert!(checker
            .debug_msg()
            .contains("loc-reg inconsistency: fired locals (1) != expected from reg (2)"));
    }

    #[test]
    fn test_inconsistent_trigger() {
        let mut checker = RawDataChecker::new(CrateMasks::all_active(), &MockConfig::new());
        let trigger = raw_info::PHY | raw_info::CALIBRATE;
        let mut boards = vec![RoBoard::new(REG, trigger, 0x00, 0xF)];
        boards.extend((0..4).map(|iloc| RoBoard::new(LOC, trigger, iloc, 0)));
        assert!(!checker.process(&boards, &event(&boards, InteractionRecord::new(5, 1))));
        assert!(checker.debug_msg().contains("calibration and physics"));
    }

    #[test]
    fn test_masks_latched_at_start_of_run() {
        let mut checker = RawDataChecker::new(CrateMasks::all_active(), &MockConfig::new());
        let mut sox_loc = RoBoard::new(LOC, raw_info::SOX, 0x01, 0x1);
        sox_loc.patterns_bp[0] = 0xFF00;
        let mut boards = vec![RoBoard::new(REG, raw_info::SOX, 0x00, 0xF)];
        boards.extend((0..4).map(|iloc| if iloc == 1 { sox_loc } else { RoBoard::new(LOC, raw_info::SOX, iloc, 0) }));
        assert!(checker.process(&boards, &event(&boards, InteractionRecord::new(0, 1))));

        let mut masked = RoBoard::new(LOC | raw_info::OVERWRITTEN, 0, 0x01, 0x1);
        masked.patterns_bp[0] = 0xFF00;
        let self_triggered = [RoBoard::new(REG, 0, 0x00, 0x2), masked];
        assert!(checker.process(&self_triggered, &event(&self_triggered, InteractionRecord::new(3, 2))));

        masked.patterns_bp[0] = 0x0F00;
        let self_triggered = [RoBoard::new(REG, 0, 0x00, 0x2), masked];
        assert!(!checker.process(&self_triggered, &event(&self_triggered, InteractionRecord::new(3, 2))));
        assert!(checker.debug_msg().contains("not compatible with mask"));

        checker.reset();
        assert_eq!(checker.n_events_processed(), 0);
    }

    #[test]
    fn test_events_after_end_of_run_skip_reg_loc_check() {
        let mut checker = RawDataChecker::new(CrateMasks::all_active(), &MockConfig::new());
        let mut boards = vec![RoBoard::new(REG, raw_info::EOX, 0x00, 0xF)];
        boards.extend((0..4).map(|iloc| RoBoard::new(LOC, raw_info::EOX, iloc, 0)));
        let mut rofs = event(&boards, InteractionRecord::new(100, 5));
        // A regional answer without its local boards, just before the end of run
        boards.push(RoBoard::new(REG, raw_info::PHY, 0x00, 0xF));
        rofs.push(RofRecord::new(InteractionRecord::new(98, 5), EventType::Standard, 5, 1));
        assert!(checker.process(&boards, &rofs));
        assert_eq!(checker.n_events_processed(), 2);
    }
}
