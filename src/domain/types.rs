// ==========================================
// 案卷数据导入系统 - 领域类型定义
// ==========================================
// 职责: 条目类型 / 计费类别 / 客户分类 的封闭枚举
// 红线: 新增标签必须显式修改代码，禁止开放字符串常量
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 条目类型 (Entry Type)
// ==========================================
// 源文件 `type` 列取值，统一带 `-type` 后缀
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    #[serde(rename = "email-type")]
    Email, // 邮件
    #[serde(rename = "doc-type")]
    Doc, // 文档
    #[serde(rename = "meeting-type")]
    Meeting, // 会议
    #[serde(rename = "phone-call-type")]
    PhoneCall, // 电话
    #[serde(rename = "case-note-type")]
    CaseNote, // 案件笔记
    #[serde(rename = "billing-type")]
    Billing, // 计费
    #[serde(rename = "other-type")]
    Other, // 其他
}

impl EntryType {
    /// 全部条目类型（按源系统声明顺序）
    pub const ALL: [EntryType; 7] = [
        EntryType::Email,
        EntryType::Doc,
        EntryType::Meeting,
        EntryType::PhoneCall,
        EntryType::CaseNote,
        EntryType::Billing,
        EntryType::Other,
    ];

    /// 源文件中的标签文本
    pub fn tag(&self) -> &'static str {
        match self {
            EntryType::Email => "email-type",
            EntryType::Doc => "doc-type",
            EntryType::Meeting => "meeting-type",
            EntryType::PhoneCall => "phone-call-type",
            EntryType::CaseNote => "case-note-type",
            EntryType::Billing => "billing-type",
            EntryType::Other => "other-type",
        }
    }

    /// 精确匹配标签（区分大小写，不做 trim）
    pub fn from_tag(tag: &str) -> Option<EntryType> {
        EntryType::ALL.into_iter().find(|t| t.tag() == tag)
    }

    pub fn is_billing(&self) -> bool {
        matches!(self, EntryType::Billing)
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ==========================================
// 客户分类 (Client Classification)
// ==========================================
// 决定计费类别词表；当前没有任何数据可推断 CPCS，只能由调用方显式传入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientClassification {
    #[default]
    General, // 普通客户
    Cpcs, // CPCS 受限词表客户
}

impl ClientClassification {
    /// 解析配置值（大小写不敏感）
    pub fn parse(value: &str) -> Option<ClientClassification> {
        match value.trim().to_ascii_lowercase().as_str() {
            "general" => Some(ClientClassification::General),
            "cpcs" => Some(ClientClassification::Cpcs),
            _ => None,
        }
    }

    /// 该分类生效的计费类别词表
    pub fn vocabulary(&self) -> BillingVocabulary {
        match self {
            ClientClassification::General => BillingVocabulary::General,
            ClientClassification::Cpcs => BillingVocabulary::Cpcs,
        }
    }
}

impl fmt::Display for ClientClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientClassification::General => write!(f, "general"),
            ClientClassification::Cpcs => write!(f, "cpcs"),
        }
    }
}

// ==========================================
// 计费类别词表 (Billing Vocabulary)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingVocabulary {
    General,
    Cpcs,
}

impl BillingVocabulary {
    /// 判断类别是否属于本词表（精确匹配）
    pub fn contains(&self, category: &str) -> bool {
        match self {
            BillingVocabulary::General => BillingCategory::from_label(category).is_some(),
            BillingVocabulary::Cpcs => CpcsBillingCategory::from_label(category).is_some(),
        }
    }

    /// 报告中展示的“允许类别”说明
    pub fn allowed_description(&self) -> String {
        match self {
            BillingVocabulary::General => "General billing categories".to_string(),
            BillingVocabulary::Cpcs => CpcsBillingCategory::ALL
                .iter()
                .map(|c| c.label())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

// ==========================================
// 普通计费类别 (General Billing Category)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BillingCategory {
    HearingPreparation,
    Hearing,
    HearingNotesFollowUp,
    BillingInvoicing,
    DraftCorrespondence,
    DraftEmail,
    DraftDocuments,
    DraftRecords,
    ReviewCorrespondence,
    ReviewEmail,
    ReviewDocuments,
    ReviewRecords,
    ClientInterviewPreparation,
    ClientInterview,
    ClientInterviewNotesFollowUp,
    ClientMeetingPreparation,
    ClientMeeting,
    ClientMeetingNotesFollowUp,
    ClientStatusUpdatePreparation,
    ClientStatusUpdate,
    ClientStatusUpdateNotesFollowUp,
    ConferenceWithAttorneyPreparation,
    ConferenceWithAttorney,
    ConferenceWithAttorneyNotesFollowUp,
    SettlementAgreementDrafting,
    SettlementAgreementReviewAnalysis,
    CourtAppearancePreparation,
    CourtAppearance,
    CourtAppearanceNotesFollowUp,
    MediationMeetingPreparation,
    MediationMeeting,
    MediationMeetingNotesFollowUp,
    DiscoveryDrafting,
    DiscoveryReview,
    DiscoveryProduction,
    LegalResearch,
    SettlementPreparation,
    Settlement,
    SettlementNotesFollowUp,
    MediationPreparation,
    Mediation,
    MediationNotesFollowUp,
    MeetingWithOpposingCounselPreparation,
    MeetingWithOpposingCounsel,
    MeetingWithOpposingCounselNotesFollowUp,
    PhoneCallPreparation,
    PhoneCall,
    PhoneCallNotesFollowUp,
    PrepareReport,
    ReviewReport,
    TeamCaseStrategyMeetingPreparation,
    TeamCaseStrategyMeeting,
    TeamCaseStrategyMeetingNotesFollowUp,
    TrialPreparation,
    TravelTime,
}

impl BillingCategory {
    pub const ALL: [BillingCategory; 55] = [
        BillingCategory::HearingPreparation,
        BillingCategory::Hearing,
        BillingCategory::HearingNotesFollowUp,
        BillingCategory::BillingInvoicing,
        BillingCategory::DraftCorrespondence,
        BillingCategory::DraftEmail,
        BillingCategory::DraftDocuments,
        BillingCategory::DraftRecords,
        BillingCategory::ReviewCorrespondence,
        BillingCategory::ReviewEmail,
        BillingCategory::ReviewDocuments,
        BillingCategory::ReviewRecords,
        BillingCategory::ClientInterviewPreparation,
        BillingCategory::ClientInterview,
        BillingCategory::ClientInterviewNotesFollowUp,
        BillingCategory::ClientMeetingPreparation,
        BillingCategory::ClientMeeting,
        BillingCategory::ClientMeetingNotesFollowUp,
        BillingCategory::ClientStatusUpdatePreparation,
        BillingCategory::ClientStatusUpdate,
        BillingCategory::ClientStatusUpdateNotesFollowUp,
        BillingCategory::ConferenceWithAttorneyPreparation,
        BillingCategory::ConferenceWithAttorney,
        BillingCategory::ConferenceWithAttorneyNotesFollowUp,
        BillingCategory::SettlementAgreementDrafting,
        BillingCategory::SettlementAgreementReviewAnalysis,
        BillingCategory::CourtAppearancePreparation,
        BillingCategory::CourtAppearance,
        BillingCategory::CourtAppearanceNotesFollowUp,
        BillingCategory::MediationMeetingPreparation,
        BillingCategory::MediationMeeting,
        BillingCategory::MediationMeetingNotesFollowUp,
        BillingCategory::DiscoveryDrafting,
        BillingCategory::DiscoveryReview,
        BillingCategory::DiscoveryProduction,
        BillingCategory::LegalResearch,
        BillingCategory::SettlementPreparation,
        BillingCategory::Settlement,
        BillingCategory::SettlementNotesFollowUp,
        BillingCategory::MediationPreparation,
        BillingCategory::Mediation,
        BillingCategory::MediationNotesFollowUp,
        BillingCategory::MeetingWithOpposingCounselPreparation,
        BillingCategory::MeetingWithOpposingCounsel,
        BillingCategory::MeetingWithOpposingCounselNotesFollowUp,
        BillingCategory::PhoneCallPreparation,
        BillingCategory::PhoneCall,
        BillingCategory::PhoneCallNotesFollowUp,
        BillingCategory::PrepareReport,
        BillingCategory::ReviewReport,
        BillingCategory::TeamCaseStrategyMeetingPreparation,
        BillingCategory::TeamCaseStrategyMeeting,
        BillingCategory::TeamCaseStrategyMeetingNotesFollowUp,
        BillingCategory::TrialPreparation,
        BillingCategory::TravelTime,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BillingCategory::HearingPreparation => "Hearing Preparation",
            BillingCategory::Hearing => "Hearing",
            BillingCategory::HearingNotesFollowUp => "Hearing Notes & Follow-up",
            BillingCategory::BillingInvoicing => "Billing & Invoicing",
            BillingCategory::DraftCorrespondence => "Draft correspondence",
            BillingCategory::DraftEmail => "Draft email",
            BillingCategory::DraftDocuments => "Draft documents",
            BillingCategory::DraftRecords => "Draft records",
            BillingCategory::ReviewCorrespondence => "Review correspondence",
            BillingCategory::ReviewEmail => "Review email",
            BillingCategory::ReviewDocuments => "Review documents",
            BillingCategory::ReviewRecords => "Review records",
            BillingCategory::ClientInterviewPreparation => "Client Interview Preparation",
            BillingCategory::ClientInterview => "Client Interview",
            BillingCategory::ClientInterviewNotesFollowUp => "Client Interview Notes & Follow-up",
            BillingCategory::ClientMeetingPreparation => "Client Meeting Preparation",
            BillingCategory::ClientMeeting => "Client Meeting",
            BillingCategory::ClientMeetingNotesFollowUp => "Client Meeting Notes & Follow-up",
            BillingCategory::ClientStatusUpdatePreparation => "Client Status Update Preparation",
            BillingCategory::ClientStatusUpdate => "Client Status Update",
            BillingCategory::ClientStatusUpdateNotesFollowUp => {
                "Client Status Update Notes & Follow-up"
            }
            BillingCategory::ConferenceWithAttorneyPreparation => {
                "Conference with Attorney Preparation"
            }
            BillingCategory::ConferenceWithAttorney => "Conference with Attorney",
            BillingCategory::ConferenceWithAttorneyNotesFollowUp => {
                "Conference with Attorney Notes & Follow-up"
            }
            BillingCategory::SettlementAgreementDrafting => "Settlement Agreement Drafting",
            BillingCategory::SettlementAgreementReviewAnalysis => {
                "Settlement Agreement Review & Analysis"
            }
            BillingCategory::CourtAppearancePreparation => "Court Appearance Preparation",
            BillingCategory::CourtAppearance => "Court Appearance",
            BillingCategory::CourtAppearanceNotesFollowUp => "Court Appearance Notes & Follow-up",
            BillingCategory::MediationMeetingPreparation => "Mediation Meeting Preparation",
            BillingCategory::MediationMeeting => "Mediation Meeting",
            BillingCategory::MediationMeetingNotesFollowUp => "Mediation Meeting Notes & Follow-up",
            BillingCategory::DiscoveryDrafting => "Discovery Drafting",
            BillingCategory::DiscoveryReview => "Discovery Review",
            BillingCategory::DiscoveryProduction => "Discovery Production",
            BillingCategory::LegalResearch => "Legal Research",
            BillingCategory::SettlementPreparation => "Settlement Preparation",
            BillingCategory::Settlement => "Settlement",
            BillingCategory::SettlementNotesFollowUp => "Settlement Notes & Follow-up",
            BillingCategory::MediationPreparation => "Mediation Preparation",
            BillingCategory::Mediation => "Mediation",
            BillingCategory::MediationNotesFollowUp => "Mediation Notes & Follow-up",
            BillingCategory::MeetingWithOpposingCounselPreparation => {
                "Meeting with Opposing Counsel Preparation"
            }
            BillingCategory::MeetingWithOpposingCounsel => "Meeting with Opposing Counsel",
            BillingCategory::MeetingWithOpposingCounselNotesFollowUp => {
                "Meeting with Opposing Counsel Notes & Follow-up"
            }
            BillingCategory::PhoneCallPreparation => "Phone Call Preparation",
            BillingCategory::PhoneCall => "Phone Call",
            BillingCategory::PhoneCallNotesFollowUp => "Phone Call Notes & Follow-up",
            BillingCategory::PrepareReport => "Prepare Report",
            BillingCategory::ReviewReport => "Review Report",
            BillingCategory::TeamCaseStrategyMeetingPreparation => {
                "Team/Case Strategy Meeting Preparation"
            }
            BillingCategory::TeamCaseStrategyMeeting => "Team/Case Strategy Meeting",
            BillingCategory::TeamCaseStrategyMeetingNotesFollowUp => {
                "Team/Case Strategy Meeting Notes & Follow-up"
            }
            BillingCategory::TrialPreparation => "Trial Preparation",
            BillingCategory::TravelTime => "Travel Time",
        }
    }

    pub fn from_label(label: &str) -> Option<BillingCategory> {
        BillingCategory::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for BillingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ==========================================
// CPCS 受限计费类别
// ==========================================
// 注意大小写与普通词表不同（"Conference With Attorney" / "Review Documents"）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpcsBillingCategory {
    ClientInterview,
    ConferenceWithAttorney,
    CourtAppearance,
    ExamineTestMaterial,
    PhoneCalls,
    PrepareReport,
    ReviewDocuments,
    TravelTime,
}

impl CpcsBillingCategory {
    pub const ALL: [CpcsBillingCategory; 8] = [
        CpcsBillingCategory::ClientInterview,
        CpcsBillingCategory::ConferenceWithAttorney,
        CpcsBillingCategory::CourtAppearance,
        CpcsBillingCategory::ExamineTestMaterial,
        CpcsBillingCategory::PhoneCalls,
        CpcsBillingCategory::PrepareReport,
        CpcsBillingCategory::ReviewDocuments,
        CpcsBillingCategory::TravelTime,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CpcsBillingCategory::ClientInterview => "Client Interview",
            CpcsBillingCategory::ConferenceWithAttorney => "Conference With Attorney",
            CpcsBillingCategory::CourtAppearance => "Court Appearance",
            CpcsBillingCategory::ExamineTestMaterial => "Examine/Test Material",
            CpcsBillingCategory::PhoneCalls => "Phone Calls",
            CpcsBillingCategory::PrepareReport => "Prepare Report",
            CpcsBillingCategory::ReviewDocuments => "Review Documents",
            CpcsBillingCategory::TravelTime => "Travel Time",
        }
    }

    pub fn from_label(label: &str) -> Option<CpcsBillingCategory> {
        CpcsBillingCategory::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for CpcsBillingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
