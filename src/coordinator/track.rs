//! 取得トラック（集計 / 一覧）ごとの進行状態
//!
//! 発行ごとに単調増加するチケットを振り、完了時に最新チケットと比較する。
//! 追い越された取得の結果は反映しない。

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
}

/// 取得要求の番号
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn number(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Track {
    issued: u64,
    phase: Phase,
    failed: bool,
}

impl Track {
    /// 新しい取得を開始する
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        self.phase = Phase::Loading;
        Ticket(self.issued)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.issued
    }

    /// 最新の取得なら完了にしてtrue。追い越されていればfalse（状態は変えない）
    pub fn finish(&mut self, ticket: Ticket, failed: bool) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.phase = Phase::Ready;
        self.failed = failed;
        true
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// 直近の反映がフォールバック値だったか
    pub fn failed(&self) -> bool {
        self.failed
    }
}
