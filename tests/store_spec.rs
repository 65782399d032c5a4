use allroads::models::*;
use allroads::store::*;
use chrono::{Datelike, Local, NaiveDate};
use speculate2::speculate;

fn titles(roadmap: &Roadmap, quarter: usize) -> Vec<String> {
    roadmap.quarters()[quarter]
        .features
        .iter()
        .map(|f| f.title.clone())
        .collect()
}

fn add(roadmap: &mut Roadmap, quarter: usize, title: &str) -> FeatureKey {
    match roadmap
        .add_feature(quarter, &FeatureDraft::new(title, ""))
        .expect("Failed to add feature")
    {
        Change::FeatureAdded { key, .. } => key,
        other => panic!("unexpected change {:?}", other),
    }
}

/// Two quarters, 2025 Q1 holding A, B, C and 2025 Q2 holding D, E.
fn two_quarters() -> (Roadmap, Vec<FeatureKey>) {
    let mut roadmap = Roadmap::new();
    roadmap.add_quarter_or_start(2025).expect("Failed to add quarter");
    roadmap.add_quarter_or_start(2025).expect("Failed to add quarter");
    let keys = vec![
        add(&mut roadmap, 0, "A"),
        add(&mut roadmap, 0, "B"),
        add(&mut roadmap, 0, "C"),
        add(&mut roadmap, 1, "D"),
        add(&mut roadmap, 1, "E"),
    ];
    (roadmap, keys)
}

fn period(year: i64, quarter: i64) -> Period {
    Period::new(year, quarter).expect("valid period")
}

speculate! {
    before {
        let mut roadmap = Roadmap::new();
    }

    describe "quarters" {
        describe "add_quarter" {
            it "starts at Q1 of the current year when empty" {
                let change = roadmap.add_quarter().expect("Failed to add quarter");

                let expected = period(i64::from(Local::now().year()), 1);
                assert_eq!(change, Change::QuarterAdded(expected));
                assert_eq!(roadmap.quarters()[0].period, expected);
            }

            it "follows the last quarter and rolls over the year" {
                roadmap.add_quarter_or_start(2024).expect("Failed");
                roadmap.add_quarter_or_start(2024).expect("Failed");
                roadmap.add_quarter_or_start(2024).expect("Failed");
                roadmap.add_quarter_or_start(2024).expect("Failed");
                assert_eq!(roadmap.quarters()[3].period, period(2024, 4));

                let change = roadmap.add_quarter().expect("Failed");
                assert_eq!(change, Change::QuarterAdded(period(2025, 1)));
                assert_eq!(change.to_string(), "Added Q1 2025");
            }
        }

        describe "remove_quarter" {
            it "is a no-op on an empty roadmap" {
                assert_eq!(roadmap.remove_quarter(), Change::Unchanged);
                assert!(roadmap.is_empty());
            }

            it "removes only the last quarter" {
                let (mut roadmap, _) = two_quarters();

                let change = roadmap.remove_quarter();

                assert_eq!(change, Change::QuarterRemoved(period(2025, 2)));
                assert_eq!(roadmap.quarters().len(), 1);
                assert_eq!(titles(&roadmap, 0), vec!["A", "B", "C"]);
            }
        }

        describe "starting_at" {
            it "lays out the current quarter and the next three" {
                let date = NaiveDate::from_ymd_opt(2025, 11, 3).expect("date");
                let roadmap = Roadmap::starting_at(date).expect("Failed");

                let periods: Vec<Period> = roadmap.quarters().iter().map(|q| q.period).collect();
                assert_eq!(periods, vec![period(2025, 4), period(2026, 1), period(2026, 2), period(2026, 3)]);
            }
        }

        describe "clear" {
            it "removes everything" {
                let (mut roadmap, _) = two_quarters();
                assert_eq!(roadmap.clear(), Change::Cleared);
                assert!(roadmap.is_empty());
                assert_eq!(roadmap.feature_count(), 0);
            }
        }
    }

    describe "features" {
        describe "add_feature" {
            it "appends with defaults" {
                roadmap.add_quarter_or_start(2025).expect("Failed");
                let key = add(&mut roadmap, 0, "Login");

                let feature = roadmap.feature(key).expect("feature exists");
                assert_eq!(feature.id, "feature_0");
                assert_eq!(feature.color.as_str(), DEFAULT_COLOR);
                assert!(!feature.completed);
            }

            it "rejects whitespace-only titles without storing anything" {
                roadmap.add_quarter_or_start(2025).expect("Failed");

                let result = roadmap.add_feature(0, &FeatureDraft::new("  ", "desc"));

                assert_eq!(result, Err(StoreError::Invalid(ModelError::EmptyTitle)));
                assert_eq!(roadmap.feature_count(), 0);
            }

            it "rejects a bad color" {
                roadmap.add_quarter_or_start(2025).expect("Failed");
                let draft = FeatureDraft::new("Login", "").with_color("#12345");

                assert!(roadmap.add_feature(0, &draft).is_err());
                assert_eq!(roadmap.feature_count(), 0);
            }

            it "fails for a missing quarter" {
                let result = roadmap.add_feature(3, &FeatureDraft::new("Login", ""));
                assert!(matches!(result, Err(StoreError::QuarterNotFound(_))));
            }

            it "keeps insertion order minus deletions" {
                roadmap.add_quarter_or_start(2025).expect("Failed");
                let a = add(&mut roadmap, 0, "A");
                add(&mut roadmap, 0, "B");
                let c = add(&mut roadmap, 0, "C");
                add(&mut roadmap, 0, "D");
                roadmap.delete_feature(a).expect("Failed");
                add(&mut roadmap, 0, "E");
                roadmap.delete_feature(c).expect("Failed");

                assert_eq!(titles(&roadmap, 0), vec!["B", "D", "E"]);
            }

            it "never reuses an id after a delete" {
                roadmap.add_quarter_or_start(2025).expect("Failed");
                add(&mut roadmap, 0, "A");
                let b = add(&mut roadmap, 0, "B");
                roadmap.delete_feature(b).expect("Failed");
                let c = add(&mut roadmap, 0, "C");

                assert_eq!(roadmap.feature(c).expect("exists").id, "feature_2");
                assert_ne!(b, c);
            }
        }

        describe "edit_feature" {
            it "updates fields in place and keeps position and completion" {
                let (mut roadmap, keys) = two_quarters();
                roadmap.toggle_completed(keys[1]).expect("Failed");

                let draft = FeatureDraft::new(" Renamed ", "New text").with_color("#9C27B0");
                let change = roadmap.edit_feature(keys[1], &draft).expect("Failed");

                assert_eq!(change.to_string(), "Updated feature: Renamed");
                let feature = roadmap.feature(keys[1]).expect("exists");
                assert_eq!(feature.title, "Renamed");
                assert_eq!(feature.description, "New text");
                assert_eq!(feature.color.as_str(), "#9C27B0");
                assert!(feature.completed);
                assert_eq!(roadmap.position(keys[1]), Some((0, 1)));
            }

            it "keeps the color when none is given" {
                let (mut roadmap, keys) = two_quarters();
                roadmap.edit_feature(keys[0], &FeatureDraft::new("A2", "")).expect("Failed");
                assert_eq!(roadmap.feature(keys[0]).expect("exists").color.as_str(), DEFAULT_COLOR);
            }

            it "rejects an empty title and leaves the feature alone" {
                let (mut roadmap, keys) = two_quarters();
                let result = roadmap.edit_feature(keys[0], &FeatureDraft::new("", "x"));

                assert!(result.is_err());
                assert_eq!(roadmap.feature(keys[0]).expect("exists").title, "A");
            }
        }

        describe "delete_feature" {
            it "removes the feature from its quarter" {
                let (mut roadmap, keys) = two_quarters();
                let change = roadmap.delete_feature(keys[3]).expect("Failed");

                assert_eq!(change.to_string(), "Deleted feature: D");
                assert_eq!(titles(&roadmap, 1), vec!["E"]);
                assert!(roadmap.feature(keys[3]).is_none());
                assert!(roadmap.delete_feature(keys[3]).is_err());
            }
        }

        describe "toggle_completed" {
            it "flips the flag both ways" {
                let (mut roadmap, keys) = two_quarters();

                let change = roadmap.toggle_completed(keys[0]).expect("Failed");
                assert_eq!(change.to_string(), "Marked 'A' complete");
                assert!(roadmap.feature(keys[0]).expect("exists").completed);

                roadmap.toggle_completed(keys[0]).expect("Failed");
                assert!(!roadmap.feature(keys[0]).expect("exists").completed);
            }
        }
    }

    describe "moves" {
        it "swaps with the neighbour inside a quarter" {
            let (mut roadmap, keys) = two_quarters();

            let change = roadmap.move_feature_up(keys[1]).expect("Failed");

            assert_eq!(change.to_string(), "Moved 'B' up");
            assert_eq!(titles(&roadmap, 0), vec!["B", "A", "C"]);
        }

        it "up then down on an interior feature restores the order" {
            let (mut roadmap, keys) = two_quarters();
            let before = roadmap.clone();

            roadmap.move_feature_up(keys[1]).expect("Failed");
            roadmap.move_feature_down(keys[1]).expect("Failed");

            assert_eq!(roadmap.quarters(), before.quarters());
        }

        it "moves the first feature up to the end of the previous quarter" {
            let (mut roadmap, keys) = two_quarters();
            let before = roadmap.feature(keys[3]).expect("exists").clone();

            let change = roadmap.move_feature_up(keys[3]).expect("Failed");

            assert_eq!(change.to_string(), "Moved 'D' to Q1 2025");
            assert_eq!(titles(&roadmap, 0), vec!["A", "B", "C", "D"]);
            assert_eq!(titles(&roadmap, 1), vec!["E"]);
            assert_eq!(roadmap.feature(keys[3]), Some(&before));
        }

        it "moves the last feature down to the start of the next quarter" {
            let (mut roadmap, keys) = two_quarters();

            let change = roadmap.move_feature_down(keys[2]).expect("Failed");

            assert_eq!(change, Change::FeatureMigrated {
                key: keys[2],
                title: "C".to_string(),
                to: period(2025, 2),
            });
            assert_eq!(titles(&roadmap, 0), vec!["A", "B"]);
            assert_eq!(titles(&roadmap, 1), vec!["C", "D", "E"]);
        }

        it "ignores moves past the first or last quarter" {
            let (mut roadmap, keys) = two_quarters();
            let before = roadmap.clone();

            assert_eq!(roadmap.move_feature_up(keys[0]).expect("Failed"), Change::Unchanged);
            assert_eq!(roadmap.move_feature_down(keys[4]).expect("Failed"), Change::Unchanged);
            assert_eq!(roadmap, before);
        }

        it "keeps moving into an empty quarter" {
            roadmap.add_quarter_or_start(2025).expect("Failed");
            roadmap.add_quarter_or_start(2025).expect("Failed");
            roadmap.add_quarter_or_start(2025).expect("Failed");
            let key = add(&mut roadmap, 0, "Solo");

            roadmap.move_feature_down(key).expect("Failed");
            roadmap.move_feature_down(key).expect("Failed");

            assert_eq!(roadmap.position(key), Some((2, 0)));
        }
    }

    describe "lookup" {
        it "resolves slots and ids" {
            let (roadmap, keys) = two_quarters();

            let by_slot: FeatureRef = "Q2-2025:2".parse().expect("parse");
            assert_eq!(roadmap.resolve(&by_slot), Ok(keys[4]));

            let by_id = FeatureRef::Id("feature_1".to_string());
            assert_eq!(roadmap.resolve(&by_id), Ok(keys[1]));

            let missing: FeatureRef = "Q2-2025:3".parse().expect("parse");
            assert!(matches!(roadmap.resolve(&missing), Err(StoreError::FeatureNotFound(_))));
        }

        it "resolves quarters by position and period" {
            let (roadmap, _) = two_quarters();
            assert_eq!(roadmap.quarter_index(QuarterRef::Position(2)), Ok(1));
            assert_eq!(roadmap.quarter_index(QuarterRef::Period(period(2025, 1))), Ok(0));
            assert!(roadmap.quarter_index(QuarterRef::Position(0)).is_err());
            assert!(roadmap.quarter_index(QuarterRef::Period(period(2030, 1))).is_err());
        }
    }

    describe "templates" {
        it "builds the web template across four quarters" {
            let change = roadmap.load_template_in_year(Template::Web, 2025).expect("Failed");
            assert_eq!(change.to_string(), "Loaded web template");

            let quarters = roadmap.quarters();
            assert_eq!(quarters.len(), 4);
            let counts: Vec<usize> = quarters.iter().map(|q| q.features.len()).collect();
            assert_eq!(counts, vec![2, 2, 2, 1]);

            for (i, quarter) in quarters.iter().enumerate() {
                assert_eq!(quarter.period, period(2025, i as i64 + 1));
                for (j, feature) in quarter.features.iter().enumerate() {
                    assert_eq!(feature.description, format!("Implementation of {}", feature.title));
                    assert_eq!(feature.color.as_str(), PALETTE[i % 4]);
                    assert_eq!(feature.id, format!("feature_web_{}_{}", i, j));
                    assert!(!feature.completed);
                }
            }
            assert_eq!(quarters[0].features[0].title, "Planning & Design");
            assert_eq!(quarters[3].features[0].title, "Deployment");
        }

        it "replaces an existing roadmap" {
            let (mut roadmap, keys) = two_quarters();
            roadmap.load_template(Template::Api).expect("Failed");

            assert_eq!(roadmap.quarters()[0].period, period(i64::from(Local::now().year()), 1));
            assert_eq!(roadmap.feature_count(), 7);
            assert!(roadmap.feature(keys[0]).is_none());
        }
    }
}
