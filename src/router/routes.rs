//! The static route table and path matching.

use crate::store::CredentialRecord;
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMeta {
    pub requires_auth: bool,
    pub requires_admin: bool,
}

impl RouteMeta {
    const PUBLIC: Self = Self {
        requires_auth: false,
        requires_admin: false,
    };
    const AUTH: Self = Self {
        requires_auth: true,
        requires_admin: false,
    };
    const ADMIN: Self = Self {
        requires_auth: true,
        requires_admin: true,
    };
}

/// Views the table can render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum View {
    Login,
    Register,
    AdminDashboard,
    UserDashboard,
    ManageSubjects,
    ManageChapters,
    ManageQuizzes,
    ManageQuestions,
    AvailableQuizzes,
    AttemptQuiz,
    MyScores,
    About,
    CreateCampaign,
    EditCampaign,
    MyCampaigns,
    InfluencerDashboard,
    Negotiation,
}

#[derive(Clone, Copy)]
pub enum Target {
    View(View),
    /// Computes another path from the stored credentials.
    Redirect(fn(&CredentialRecord) -> &'static str),
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::View(view) => f.debug_tuple("View").field(view).finish(),
            Self::Redirect(_) => f.write_str("Redirect"),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RouteDescriptor {
    pub path: &'static str,
    pub name: Option<&'static str>,
    pub target: Target,
    pub meta: RouteMeta,
}

const fn view(
    path: &'static str,
    name: &'static str,
    page: View,
    meta: RouteMeta,
) -> RouteDescriptor {
    RouteDescriptor {
        path,
        name: Some(name),
        target: Target::View(page),
        meta,
    }
}

/// `/` sends users to their landing page, or to `/login` without a token.
fn root_redirect(record: &CredentialRecord) -> &'static str {
    if record.has_token() {
        record.role().landing_path()
    } else {
        "/login"
    }
}

pub static ROUTES: &[RouteDescriptor] = &[
    RouteDescriptor {
        path: "/",
        name: None,
        target: Target::Redirect(root_redirect),
        meta: RouteMeta::PUBLIC,
    },
    view("/login", "Login", View::Login, RouteMeta::PUBLIC),
    view("/register", "Register", View::Register, RouteMeta::PUBLIC),
    view(
        "/admin/dashboard",
        "AdminDashboard",
        View::AdminDashboard,
        RouteMeta::ADMIN,
    ),
    view("/dashboard", "UserDashboard", View::UserDashboard, RouteMeta::AUTH),
    view(
        "/admin/subjects",
        "ManageSubjects",
        View::ManageSubjects,
        RouteMeta::ADMIN,
    ),
    view(
        "/admin/subjects/:subjectId/chapters",
        "ManageChapters",
        View::ManageChapters,
        RouteMeta::ADMIN,
    ),
    view(
        "/admin/chapters/:chapterId/quizzes",
        "ManageQuizzes",
        View::ManageQuizzes,
        RouteMeta::ADMIN,
    ),
    view(
        "/admin/quizzes/:quizId/questions",
        "ManageQuestions",
        View::ManageQuestions,
        RouteMeta::ADMIN,
    ),
    view(
        "/quizzes",
        "AvailableQuizzes",
        View::AvailableQuizzes,
        RouteMeta::AUTH,
    ),
    view(
        "/quizzes/:quizId/attempt",
        "AttemptQuiz",
        View::AttemptQuiz,
        RouteMeta::AUTH,
    ),
    view("/my-scores", "MyScores", View::MyScores, RouteMeta::AUTH),
    view("/about", "about", View::About, RouteMeta::PUBLIC),
    view(
        "/create-campaign",
        "createcampaign",
        View::CreateCampaign,
        RouteMeta::PUBLIC,
    ),
    view(
        "/edit-campaign/:id",
        "editcampaign",
        View::EditCampaign,
        RouteMeta::PUBLIC,
    ),
    view(
        "/my-campaigns",
        "mycampaigns",
        View::MyCampaigns,
        RouteMeta::PUBLIC,
    ),
    view(
        "/influencer-dashboard",
        "influencedashboard",
        View::InfluencerDashboard,
        RouteMeta::PUBLIC,
    ),
    view(
        "/negotiation/:id",
        "NegotiationPage",
        View::Negotiation,
        RouteMeta::PUBLIC,
    ),
];

#[derive(Clone, Debug)]
pub struct RouteMatch {
    pub route: &'static RouteDescriptor,
    pub params: BTreeMap<String, String>,
}

/// Drops query string and fragment, and normalises slashes.
#[must_use]
pub fn normalize_path(raw: &str) -> String {
    let path = raw
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// Finds the first route whose pattern matches `path`.
#[must_use]
pub fn match_route(path: &str) -> Option<RouteMatch> {
    let path = normalize_path(path);
    ROUTES.iter().find_map(|route| {
        match_pattern(route.path, &path).map(|params| RouteMatch { route, params })
    })
}

fn match_pattern(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    let expected: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let actual: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if expected.len() != actual.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (want, got) in expected.iter().zip(&actual) {
        if let Some(name) = want.strip_prefix(':') {
            params.insert(name.to_string(), (*got).to_string());
        } else if want != got {
            return None;
        }
    }
    Some(params)
}
